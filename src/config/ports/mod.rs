//! Port contracts for configuration access.

pub mod config_store;

pub use config_store::{ConfigError, ConfigResult, ConfigStore};

#[cfg(test)]
pub use config_store::MockConfigStore;
