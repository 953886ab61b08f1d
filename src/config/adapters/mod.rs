//! Adapter implementations for configuration access.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileConfigStore;
pub use memory::InMemoryConfigStore;
