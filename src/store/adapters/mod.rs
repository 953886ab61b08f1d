//! Adapter implementations for store access.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryDataStore;
pub use postgres::{PostgresDataStore, StorePgPool};
