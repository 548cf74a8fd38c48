//! Resolved run configuration.
//!
//! [`GameConfig`] is what the binary actually runs with: the command line
//! after defaults are applied and cross-option rules are checked.

use crate::cli::Cli;
use crate::game_state::GameSetup;
use crate::logging::LogTarget;
use crate::roster::{Roster, RosterError, load_roster_from_file, load_roster_from_str};
use crate::schema::{AttributeSchema, SchemaError};
use crate::session::{RngSource, SecretSource};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::variant::Variant;
use chrono::NaiveDate;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("the custom variant needs --schema")]
    MissingSchema,
    #[error("the custom variant needs --input")]
    MissingRoster,
    #[error("invalid --schema: {0}")]
    Schema(#[from] SchemaError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterSource {
    Embedded(Variant),
    File(PathBuf),
}

impl fmt::Display for RosterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded(variant) => write!(f, "built-in {variant:?} roster"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretMode {
    Random,
    Daily(NaiveDate),
    Seeded(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    Tui,
    Plain,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub variant: Variant,
    pub schema: AttributeSchema,
    pub roster_source: RosterSource,
    pub max_guesses: NonZeroUsize,
    pub secret_mode: SecretMode,
    pub share_path: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
    pub interface: InterfaceKind,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
}

impl GameConfig {
    /// Resolve the command line. `today` is only used for daily mode.
    pub fn from_cli(cli: &Cli, today: NaiveDate) -> Result<Self, ConfigError> {
        let schema = match (&cli.schema, cli.variant.builtin_schema()) {
            (Some(desc), _) => desc.parse::<AttributeSchema>()?,
            (None, Some(schema)) => schema,
            (None, None) => return Err(ConfigError::MissingSchema),
        };

        let roster_source = match (&cli.roster_path, cli.variant) {
            (Some(path), _) => RosterSource::File(path.clone()),
            (None, Variant::Custom) => return Err(ConfigError::MissingRoster),
            (None, variant) => RosterSource::Embedded(variant),
        };

        let secret_mode = match (cli.daily, cli.seed) {
            (true, _) => SecretMode::Daily(today),
            (false, Some(seed)) => SecretMode::Seeded(seed),
            (false, None) => SecretMode::Random,
        };

        Ok(Self {
            variant: cli.variant,
            schema,
            roster_source,
            max_guesses: cli.max_guesses,
            secret_mode,
            share_path: cli.share_file.clone(),
            state_dir: cli.state_dir.clone(),
            interface: if cli.plain {
                InterfaceKind::Plain
            } else {
                InterfaceKind::Tui
            },
            log_file: cli.log_file.clone(),
            verbose: cli.verbose,
        })
    }

    pub fn load_roster(&self) -> Result<Arc<Roster>, RosterError> {
        let roster = match &self.roster_source {
            RosterSource::File(path) => load_roster_from_file(&self.schema, path)?,
            RosterSource::Embedded(variant) => {
                let data = variant.embedded_roster().ok_or(RosterError::Empty)?;
                load_roster_from_str(&self.schema, data)?
            }
        };
        Ok(Arc::new(roster))
    }

    pub fn secret_source(&self) -> Box<dyn SecretSource> {
        match self.secret_mode {
            SecretMode::Random => Box::new(RngSource::thread()),
            SecretMode::Daily(date) => Box::new(RngSource::daily(date)),
            SecretMode::Seeded(seed) => Box::new(RngSource::seeded(seed)),
        }
    }

    /// The instructions-flag store. Falls back to memory when there is no
    /// config directory, which means instructions show every run.
    pub fn store(&self) -> Box<dyn KeyValueStore> {
        let store = match &self.state_dir {
            Some(dir) => Some(FileStore::in_dir(dir)),
            None => FileStore::in_config_dir(),
        };
        match store {
            Some(store) => Box::new(store),
            None => {
                log::warn!("No config directory found; instructions will always be shown");
                Box::new(MemoryStore::new())
            }
        }
    }

    pub fn log_target(&self) -> LogTarget {
        match (&self.log_file, self.interface) {
            (Some(path), _) => LogTarget::File(path.clone()),
            (None, InterfaceKind::Tui) => LogTarget::Off,
            (None, InterfaceKind::Plain) => LogTarget::Stderr,
        }
    }

    pub fn game_setup(&self, roster: Arc<Roster>) -> GameSetup {
        GameSetup {
            roster,
            max_guesses: self.max_guesses,
            noun: self.variant.noun().to_string(),
            share_format: self.variant.share_format(),
            share_path: self.share_path.clone(),
        }
    }
}
