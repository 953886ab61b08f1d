//! Journal port recording the progress of upgrade runs.

use crate::migration::domain::{JournalEntry, RunId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for journal operations.
pub type JournalResult<T> = Result<T, JournalError>;

/// Append-only record of upgrade runs.
///
/// Failures to record never change the outcome of a run; the orchestrator
/// logs them and carries on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MigrationJournal: Send + Sync {
    /// Appends an entry.
    async fn record(&self, entry: &JournalEntry) -> JournalResult<()>;

    /// Returns every entry of a run in sequence order.
    async fn entries_for(&self, run_id: RunId) -> JournalResult<Vec<JournalEntry>>;
}

/// Errors returned by journal adapters.
#[derive(Debug, Clone, Error)]
pub enum JournalError {
    /// Persistence-layer failure.
    #[error("journal persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl JournalError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
