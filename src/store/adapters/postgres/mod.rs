//! `PostgreSQL` adapter for the store port.

mod sql;
mod store;

pub use store::{PostgresDataStore, StorePgPool};
