//! Store access port used by migration steps.

use crate::store::domain::{Alteration, Predicate, Record};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Structural and row-level access to the persistent store.
///
/// Callers issue one operation at a time and treat any error as a failure
/// of the step that issued it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Applies a structural change to a collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingCollection`], [`StoreError::MissingField`]
    /// or [`StoreError::MissingIndex`] when the change depends on something
    /// absent, and the matching `*Exists` variant when it would duplicate an
    /// existing field or index.
    async fn alter(&self, alteration: &Alteration) -> StoreResult<()>;

    /// Returns every record of `collection` matching `filter`.
    async fn select(&self, collection: &str, filter: &Predicate) -> StoreResult<Vec<Record>>;

    /// Sets `changes` on every record matching `filter` and returns the
    /// number of records written.
    async fn update(
        &self,
        collection: &str,
        filter: &Predicate,
        changes: &Record,
    ) -> StoreResult<u64>;

    /// Inserts a record.
    async fn insert(&self, collection: &str, record: &Record) -> StoreResult<()>;

    /// Deletes every record matching `filter` and returns how many were
    /// removed.
    async fn delete(&self, collection: &str, filter: &Predicate) -> StoreResult<u64>;

    /// Executes a raw statement that predicate composition cannot express.
    ///
    /// Returns the number of affected rows as reported by the store.
    async fn execute_raw(&self, statement: &str) -> StoreResult<u64>;
}

/// Errors returned by store adapters.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The collection does not exist.
    #[error("collection not found: {0}")]
    MissingCollection(String),

    /// The field does not exist on the collection.
    #[error("field {field} not found on {collection}")]
    MissingField {
        /// Collection name.
        collection: String,
        /// Field name.
        field: String,
    },

    /// The field already exists on the collection.
    #[error("field {field} already exists on {collection}")]
    FieldExists {
        /// Collection name.
        collection: String,
        /// Field name.
        field: String,
    },

    /// The index does not exist on the collection.
    #[error("index {index} not found on {collection}")]
    MissingIndex {
        /// Collection name.
        collection: String,
        /// Index name.
        index: String,
    },

    /// The index already exists on the collection.
    #[error("index {index} already exists on {collection}")]
    IndexExists {
        /// Collection name.
        collection: String,
        /// Index name.
        index: String,
    },

    /// A record could not be represented by the store.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` when the error reports something a step depends on as
    /// absent, usually because an earlier migration has not run.
    #[must_use]
    pub const fn is_missing_prerequisite(&self) -> bool {
        matches!(
            self,
            Self::MissingCollection(_) | Self::MissingField { .. } | Self::MissingIndex { .. }
        )
    }
}
