//! Adapter implementations for migration ports.

pub mod memory;

pub use memory::InMemoryJournal;
