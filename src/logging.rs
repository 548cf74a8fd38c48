// Logging setup and conditional trace macros.
//
// `debug_log!`/`info_log!` are for chatty trace points and vanish from release
// builds. Anything the player or operator must see (skipped roster rows,
// storage failures) goes through `log::warn!` directly.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}

/// Where log records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    /// Used by the TUI when no log file is configured, since stderr shares
    /// the terminal with the alternate screen.
    Off,
}

/// Install the global logger.
///
/// `RUST_LOG` wins when set; otherwise the level is `warn`, or `debug` with
/// `verbose`. A log file that cannot be opened falls back to stderr.
pub fn init_logging(verbose: bool, target: &LogTarget) {
    let default_level = match target {
        LogTarget::Off => "off",
        _ if verbose => "debug",
        _ => "warn",
    };
    let env = env_logger::Env::default().default_filter_or(default_level);
    let mut builder = env_logger::Builder::from_env(env);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} {:<5} [{}] {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    let mut open_failure = None;
    if let LogTarget::File(path) = target {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => open_failure = Some((path, e)),
        }
    }

    if builder.try_init().is_err() {
        debug_log!("Logger already initialised");
        return;
    }
    if let Some((path, e)) = open_failure {
        log::warn!("Could not open log file {}: {e}", path.display());
    }
}
