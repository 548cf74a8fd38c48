use crate::game_state::{GameInterface, UserAction, cell_text};
use crate::schema::Entity;
use crate::session::{DEFAULT_MAX_GUESSES, GameSession};
use crate::share::outcome_message;
use crate::variant::Variant;
use clap::Parser;
use std::io::BufRead;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Guess the mystery entity from a roster, one attribute hint at a time
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Which game to play
    #[arg(long, value_enum, default_value_t = Variant::Celebrity)]
    pub variant: Variant,

    /// Path to a CSV roster with a header row
    #[arg(short = 'i', long = "input")]
    pub roster_path: Option<PathBuf>,

    /// Schema for the roster, e.g. "name=identity,age=numeric,teams=set"
    #[arg(long)]
    pub schema: Option<String>,

    /// Number of guesses allowed per game
    #[arg(short = 'm', long, default_value_t = DEFAULT_MAX_GUESSES)]
    pub max_guesses: NonZeroUsize,

    /// Draw today's mystery (same for everyone on a given date)
    #[arg(long, conflicts_with = "seed")]
    pub daily: bool,

    /// Seed for a reproducible sequence of mysteries
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also write share text to this file
    #[arg(long)]
    pub share_file: Option<PathBuf>,

    /// Directory for the small state file (defaults to the config directory)
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Use the line-based interface instead of the terminal UI
    #[arg(long)]
    pub plain: bool,

    /// Append log output to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

const MAX_MATCHES_DISPLAY: usize = 10;

fn parse_command(input: &str) -> Option<UserAction> {
    let lower = input.to_lowercase();
    match lower.as_str() {
        "" => None,
        "exit" | "quit" => Some(UserAction::Exit),
        "next" | "new" => Some(UserAction::NewGame),
        "give up" | "giveup" => Some(UserAction::GiveUp),
        "share" => Some(UserAction::Share),
        _ => match input.strip_prefix('?') {
            Some(query) => Some(UserAction::Search(query.trim().to_string())),
            None => Some(UserAction::Guess(input.to_string())),
        },
    }
}

/// Table lines for the guesses so far: a header, then one row per guess.
/// Matched cells are wrapped in brackets.
pub fn format_board(session: &GameSession) -> Vec<String> {
    let schema = session.roster().schema();
    let mut lines = vec![format!(
        "Guesses: {}/{}",
        session.guesses().len(),
        session.max_guesses()
    )];
    if session.guesses().is_empty() {
        return lines;
    }

    let header: Vec<&str> = std::iter::once(schema.identity().key.as_str())
        .chain(schema.scored().map(|a| a.key.as_str()))
        .collect();
    lines.push(header.join(" | "));
    for guess in session.guesses() {
        let mut cells = vec![guess.identity().to_string()];
        for (value, &verdict) in guess.entity().values().iter().zip(guess.verdicts()) {
            let text = cell_text(value, verdict);
            cells.push(if verdict.is_match() {
                format!("[{text}]")
            } else {
                text
            });
        }
        lines.push(cells.join(" | "));
    }
    lines
}

/// Line-based interface over any `BufRead`.
pub struct CliInterface<R: BufRead> {
    reader: R,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn read_line(&mut self) -> Option<String> {
        let mut input = String::new();
        match self.reader.read_line(&mut input) {
            Ok(0) => None,
            Ok(_) => Some(input.trim().to_string()),
            Err(e) => {
                log::warn!("Could not read input: {e}");
                None
            }
        }
    }
}

impl<R: BufRead> GameInterface for CliInterface<R> {
    fn display_instructions(&mut self, lines: &[String]) {
        for line in lines {
            println!("{line}");
        }
    }

    fn display_new_game(&mut self, session: &GameSession) {
        println!(
            "New game started. {} candidates, {} guesses.",
            session.roster().len(),
            session.max_guesses()
        );
    }

    fn read_action(&mut self, session: &GameSession) -> Option<UserAction> {
        if session.status().is_terminal() {
            println!("\nType 'share', 'next' for a new game, or 'exit':");
        } else {
            println!(
                "\nType a name to guess, '?text' to search, 'give up', 'next', or 'exit':"
            );
        }
        // end of input behaves like exit
        let Some(input) = self.read_line() else {
            return Some(UserAction::Exit);
        };
        let action = parse_command(&input);
        if action.is_none() {
            println!("Please type something.");
        }
        action
    }

    fn display_matches(&mut self, matches: &[&Entity]) {
        if matches.is_empty() {
            println!("No matches.");
            return;
        }
        println!("Matches ({}):", matches.len());
        for entity in matches.iter().take(MAX_MATCHES_DISPLAY) {
            println!("  {}", entity.identity());
        }
        if matches.len() > MAX_MATCHES_DISPLAY {
            println!("  ...and {} more", matches.len() - MAX_MATCHES_DISPLAY);
        }
    }

    fn display_board(&mut self, session: &GameSession) {
        for line in format_board(session) {
            println!("{line}");
        }
    }

    fn display_rejection(&mut self, message: &str) {
        println!("Not allowed: {message}.");
    }

    fn display_game_over(&mut self, session: &GameSession) {
        if let Some(secret) = session.revealed_secret() {
            println!("\nThe mystery was: {}", secret.identity());
        }
        if let Some(outcome) = outcome_message(session) {
            println!("{outcome}");
        }
    }

    fn display_share(&mut self, text: &str) {
        println!("\n{text}\n");
    }

    fn display_notice(&mut self, message: &str) {
        println!("{message}");
    }

    fn display_exit_message(&mut self) {
        println!("Exiting.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Roster;
    use crate::schema::{Attribute, AttributeKind, AttributeSchema, Value};
    use crate::session::FixedSecret;
    use std::io::Cursor;
    use std::sync::Arc;

    fn session() -> GameSession {
        let schema = AttributeSchema::new(vec![
            Attribute::new("name", AttributeKind::Identity),
            Attribute::new("country", AttributeKind::ExactMatch),
            Attribute::new("age", AttributeKind::OrderedNumeric),
        ])
        .unwrap();
        let entities = vec![
            Entity::new("Ed Sheeran", vec![Value::Text("UK".into()), Value::Number(33)]),
            Entity::new("Rihanna", vec![Value::Text("Barbados".into()), Value::Number(36)]),
            Entity::new("Tom Hanks", vec![Value::Text("USA".into()), Value::Number(67)]),
        ];
        let roster = Arc::new(Roster::new(schema, entities).unwrap());
        GameSession::new(roster, NonZeroUsize::new(8).unwrap(), &mut FixedSecret(1))
    }

    #[test]
    fn test_parse_cli_defaults() {
        let cli = Cli::try_parse_from(["mystery-guess"]).unwrap();
        assert_eq!(cli.variant, Variant::Celebrity);
        assert_eq!(cli.max_guesses.get(), 8);
        assert!(cli.roster_path.is_none());
        assert!(!cli.daily);
        assert!(!cli.plain);
    }

    #[test]
    fn test_parse_cli_options() {
        let cli = Cli::try_parse_from([
            "mystery-guess",
            "--variant",
            "league",
            "-i",
            "players.csv",
            "-m",
            "5",
            "--seed",
            "42",
            "--plain",
        ])
        .unwrap();
        assert_eq!(cli.variant, Variant::League);
        assert_eq!(cli.roster_path, Some(PathBuf::from("players.csv")));
        assert_eq!(cli.max_guesses.get(), 5);
        assert_eq!(cli.seed, Some(42));
        assert!(cli.plain);
    }

    #[test]
    fn test_parse_cli_rejects_zero_guesses() {
        assert!(Cli::try_parse_from(["mystery-guess", "-m", "0"]).is_err());
    }

    #[test]
    fn test_parse_cli_daily_conflicts_with_seed() {
        assert!(Cli::try_parse_from(["mystery-guess", "--daily", "--seed", "1"]).is_err());
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("EXIT"), Some(UserAction::Exit));
        assert_eq!(parse_command("next"), Some(UserAction::NewGame));
        assert_eq!(parse_command("Give Up"), Some(UserAction::GiveUp));
        assert_eq!(parse_command("share"), Some(UserAction::Share));
        assert_eq!(
            parse_command("? tom"),
            Some(UserAction::Search("tom".to_string()))
        );
        assert_eq!(
            parse_command("Tom Hanks"),
            Some(UserAction::Guess("Tom Hanks".to_string()))
        );
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_read_action_trims_input() {
        let s = session();
        let mut ui = CliInterface::new(Cursor::new("  rihanna  \n"));
        assert_eq!(
            ui.read_action(&s),
            Some(UserAction::Guess("rihanna".to_string()))
        );
    }

    #[test]
    fn test_read_action_blank_line_is_invalid() {
        let s = session();
        let mut ui = CliInterface::new(Cursor::new("\n"));
        assert_eq!(ui.read_action(&s), None);
    }

    #[test]
    fn test_read_action_eof_exits() {
        let s = session();
        let mut ui = CliInterface::new(Cursor::new(""));
        assert_eq!(ui.read_action(&s), Some(UserAction::Exit));
    }

    #[test]
    fn test_format_board() {
        let mut s = session();
        assert_eq!(format_board(&s), vec!["Guesses: 0/8".to_string()]);
        s.submit_by_identity("Ed Sheeran").unwrap();
        s.submit_by_identity("Tom Hanks").unwrap();
        s.submit_by_identity("Rihanna").unwrap();
        assert_eq!(
            format_board(&s),
            vec![
                "Guesses: 3/8".to_string(),
                "name | country | age".to_string(),
                "Ed Sheeran | UK | 33 ↑".to_string(),
                "Tom Hanks | USA | 67 ↓".to_string(),
                "Rihanna | [Barbados] | [36]".to_string(),
            ]
        );
    }
}
