use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::entry::Entry;
use crate::config::migrate::{self, Normalized};

/// Slot holding the saved entry list
pub const ENTRIES_KEY: &str = "docker-wizard-entries-v1";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access slot file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode entries")]
    Encode(#[from] serde_json::Error),

    #[error("invalid slot key '{0}'")]
    InvalidKey(String),
}

/// Local key-value storage with string values
pub trait SlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn write(&self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// One `<key>.json` file per slot inside a directory
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, PersistError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(PersistError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PersistError + '_ {
    move |source| PersistError::Io { path: path.to_path_buf(), source }
}

impl SlotStore for FileSlots {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.slot_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    /// Replaces the slot wholesale through a temp file and rename
    fn write(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let path = self.slot_path(key)?;
        std::fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(io_error(&tmp))?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_error(&path)(e));
        }
        Ok(())
    }
}

/// Shared in-memory slots; clones see the same data
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemorySlots {
    slots: std::sync::Arc<std::sync::Mutex<std::collections::HashMap<String, String>>>,
}

#[cfg(test)]
impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl SlotStore for MemorySlots {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        let slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads and writes the whole entry list
pub trait EntryPersistence {
    /// Never fails: missing or damaged data reads as an empty list
    fn load(&self) -> Normalized;

    /// Replace the stored list with `entries`
    fn save(&self, entries: &[Entry]) -> Result<(), PersistError>;
}

/// Entry list stored as a JSON array in one slot
pub struct SlotPersistence<S> {
    slots: S,
    key: String,
}

impl<S: SlotStore> SlotPersistence<S> {
    pub fn new(slots: S, key: impl Into<String>) -> Self {
        Self { slots, key: key.into() }
    }
}

impl<S: SlotStore> EntryPersistence for SlotPersistence<S> {
    fn load(&self) -> Normalized {
        let raw = match self.slots.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Normalized::default(),
            Err(e) => {
                tracing::warn!("Could not read saved entries: {}", e);
                return Normalized::default();
            }
        };

        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(payload) => migrate::normalize_all(payload),
            Err(e) => {
                tracing::warn!("Saved entries are not valid JSON, starting empty: {}", e);
                Normalized::default()
            }
        }
    }

    fn save(&self, entries: &[Entry]) -> Result<(), PersistError> {
        let json = serde_json::to_string(entries)?;
        self.slots.write(&self.key, &json)?;
        tracing::debug!("Saved {} entries to slot '{}'", entries.len(), self.key);
        Ok(())
    }
}
