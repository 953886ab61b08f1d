//! Port contracts for persistent store access.

pub mod data_store;

pub use data_store::{DataStore, StoreError, StoreResult};

#[cfg(test)]
pub use data_store::MockDataStore;
