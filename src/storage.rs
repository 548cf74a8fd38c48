//! Advisory key-value storage for the "seen instructions" flag.
//!
//! Storage problems never stop a game: a missing or unreadable store means
//! the instructions are shown.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Key under which the flag is stored.
pub const HAS_PLAYED_KEY: &str = "celebWordleHasPlayed";

const APP_DIR: &str = "mystery-guess";
const STATE_FILE: &str = "state";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// In-memory store; optionally made to fail writes.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        if self.read_only {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "store is read-only",
            ));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// `key=value` lines in a single file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Store under the platform config directory, if there is one.
    pub fn in_config_dir() -> Option<Self> {
        get_state_path().map(Self::new)
    }

    /// Store inside an explicit directory.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(dir.as_ref().join(STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> io::Result<Vec<(String, String)>> {
        let data = fs::read_to_string(&self.path)?;
        Ok(data
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_entries() {
            Ok(entries) => entries.into_iter().find(|(k, _)| k == key).map(|(_, v)| v),
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    log::warn!("Could not read {}: {e}", self.path.display());
                }
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.read_entries().unwrap_or_default();
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body: String = entries.iter().map(|(k, v)| format!("{k}={v}\n")).collect();
        fs::write(&self.path, body)
    }
}

/// Default location of the state file, e.g. `~/.config/mystery-guess/state`.
pub fn get_state_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(STATE_FILE))
}

/// Read the flag once and mark it as seen.
///
/// Returns `true` when the instructions should be shown. Write failures are
/// logged and otherwise ignored.
pub fn should_show_instructions<S: KeyValueStore + ?Sized>(store: &mut S) -> bool {
    if store.get(HAS_PLAYED_KEY).is_some() {
        return false;
    }
    if let Err(e) = store.set(HAS_PLAYED_KEY, "true") {
        log::warn!("Could not remember that instructions were shown: {e}");
    }
    true
}
