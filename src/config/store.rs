use thiserror::Error;

use crate::config::entry::Entry;
use crate::config::persist::{EntryPersistence, PersistError};
use crate::docker::options::RunOptions;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no saved entry with id '{0}'")]
    NotFound(String),

    #[error("id prefix '{prefix}' matches {count} entries")]
    Ambiguous { prefix: String, count: usize },

    #[error("failed to save entries")]
    Persist(#[from] PersistError),
}

/// Saved presets, newest first. Every mutation is written back through the
/// injected persistence before returning.
pub struct EntryStore {
    entries: Vec<Entry>,
    persistence: Box<dyn EntryPersistence>,
}

impl EntryStore {
    /// Hydrate from storage once. Ids handed out while loading are written
    /// back so they survive the next open.
    pub fn open(persistence: Box<dyn EntryPersistence>) -> Self {
        let loaded = persistence.load();
        tracing::debug!("Loaded {} saved entries", loaded.entries.len());
        let store = Self { entries: loaded.entries, persistence };

        if loaded.ids_assigned > 0 {
            match store.persist() {
                Ok(()) => tracing::info!("Assigned ids to {} stored entries", loaded.ids_assigned),
                Err(e) => tracing::warn!("Could not store newly assigned ids: {}", e),
            }
        }
        store
    }

    pub fn list(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Find an entry by full id or unique id prefix
    pub fn resolve(&self, prefix: &str) -> Result<&Entry, StoreError> {
        let prefix = prefix.trim();
        if let Some(entry) = self.get(prefix) {
            return Ok(entry);
        }
        if prefix.is_empty() {
            return Err(StoreError::NotFound(prefix.to_string()));
        }

        let mut matches = self.entries.iter().filter(|e| e.id.starts_with(prefix));
        match (matches.next(), matches.count()) {
            (Some(entry), 0) => Ok(entry),
            (Some(_), rest) => Err(StoreError::Ambiguous {
                prefix: prefix.to_string(),
                count: rest + 1,
            }),
            (None, _) => Err(StoreError::NotFound(prefix.to_string())),
        }
    }

    /// Save a new entry at the top of the list
    pub fn create(&mut self, options: RunOptions) -> Result<Entry, StoreError> {
        let entry = Entry::new(options);
        self.entries.insert(0, entry.clone());
        self.persist()?;
        tracing::info!("Entry {} created", entry.short_id());
        Ok(entry)
    }

    /// Replace every field of an entry, keeping its id and position
    pub fn update(&mut self, id: &str, options: RunOptions) -> Result<Entry, StoreError> {
        let slot = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        *slot = Entry::with_id(slot.id.clone(), options);
        let entry = slot.clone();
        self.persist()?;
        tracing::info!("Entry {} updated", entry.short_id());
        Ok(entry)
    }

    /// Delete an entry; unknown ids are ignored
    pub fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            tracing::debug!("Entry {} not present, nothing removed", id);
            return Ok(());
        }
        self.persist()?;
        tracing::info!("Entry {} removed", id);
        Ok(())
    }

    /// Copy an entry under a fresh id with a new container name
    pub fn duplicate(&mut self, source: &Entry, container_name: &str) -> Result<Entry, StoreError> {
        let options = RunOptions {
            container_name: container_name.to_string(),
            ..source.options.clone()
        };
        let entry = self.create(options)?;
        tracing::debug!("Entry {} duplicated from {}", entry.short_id(), source.short_id());
        Ok(entry)
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.persistence.save(&self.entries)?;
        Ok(())
    }
}
