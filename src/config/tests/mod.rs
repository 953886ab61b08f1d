//! Unit tests for configuration adapters.

mod memory_tests;
mod settings_tests;
