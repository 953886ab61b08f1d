//! In-memory journal for tests and embedded runs.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::migration::{
    domain::{JournalEntry, RunId},
    ports::{JournalError, JournalResult, MigrationJournal},
};

/// Thread-safe in-memory journal.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJournal {
    entries: Arc<RwLock<Vec<JournalEntry>>>,
}

impl InMemoryJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded entry across runs, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Persistence`] if the lock is poisoned.
    pub fn entries(&self) -> JournalResult<Vec<JournalEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|err| JournalError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(entries.clone())
    }
}

#[async_trait]
impl MigrationJournal for InMemoryJournal {
    async fn record(&self, entry: &JournalEntry) -> JournalResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|err| JournalError::persistence(std::io::Error::other(err.to_string())))?;
        entries.push(entry.clone());
        Ok(())
    }

    async fn entries_for(&self, run_id: RunId) -> JournalResult<Vec<JournalEntry>> {
        let mut found: Vec<JournalEntry> = self
            .entries()?
            .into_iter()
            .filter(|entry| entry.run_id() == run_id)
            .collect();
        found.sort_by_key(JournalEntry::sequence);
        Ok(found)
    }
}
