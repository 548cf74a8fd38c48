use chrono::Local;
use mystery_guess::cli::{CliInterface, parse_cli};
use mystery_guess::config::{GameConfig, InterfaceKind};
use mystery_guess::game_loop;
use mystery_guess::logging::init_logging;
use mystery_guess::tui::TuiInterface;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = parse_cli();
    let config = match GameConfig::from_cli(&cli, Local::now().date_naive()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(config.verbose, &config.log_target());

    let roster = match config.load_roster() {
        Ok(roster) => roster,
        Err(e) => {
            eprintln!("Failed to load roster from {}: {e}", config.roster_source);
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Playing {:?} with {} candidates from {}",
        config.variant,
        roster.len(),
        config.roster_source
    );

    let setup = config.game_setup(roster);
    let mut source = config.secret_source();
    let mut store = config.store();

    if config.interface == InterfaceKind::Tui {
        match TuiInterface::new(config.variant.title()) {
            Ok(mut tui) => {
                game_loop(&setup, &mut tui, source.as_mut(), store.as_mut());
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                log::warn!("Terminal UI unavailable: {e}");
                eprintln!("Could not start the terminal UI ({e}); using plain mode.");
            }
        }
    }

    println!("Loaded {} candidates.", setup.roster.len());
    let stdin = io::stdin();
    let mut interface = CliInterface::new(stdin.lock());
    game_loop(&setup, &mut interface, source.as_mut(), store.as_mut());
    ExitCode::SUCCESS
}
