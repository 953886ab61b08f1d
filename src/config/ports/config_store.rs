//! Configuration access port used by migration steps.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Read and patch access to named configuration sources.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Reads one setting. Returns `None` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSource`] when the source does not
    /// exist.
    async fn read(&self, source: &str, key: &str) -> ConfigResult<Option<String>>;

    /// Writes one setting, creating the source when needed.
    async fn write(&self, source: &str, key: &str, value: &str) -> ConfigResult<()>;

    /// Copies keys present in `defaults` but absent from `current` into
    /// `current` and returns the copied keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSource`] when `defaults` does not
    /// exist. A missing `current` source is created.
    async fn merge_defaults(&self, defaults: &str, current: &str) -> ConfigResult<Vec<String>>;

    /// Writes `value` only when `key` is absent and reports whether it was
    /// written.
    async fn add_if_absent(&self, source: &str, key: &str, value: &str) -> ConfigResult<bool>;
}

/// Errors returned by configuration adapters.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The source does not exist.
    #[error("configuration source not found: {0}")]
    MissingSource(String),

    /// The source name cannot be used.
    #[error("invalid configuration source name: {0:?}")]
    InvalidSource(String),

    /// The source exists but its contents cannot be parsed.
    #[error("malformed configuration source {source_name}: {message}")]
    Malformed {
        /// Source name.
        source_name: String,
        /// Parser message.
        message: String,
    },

    /// Underlying I/O failure.
    #[error("configuration i/o error: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),
}

impl ConfigError {
    /// Wraps an I/O error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }
}
