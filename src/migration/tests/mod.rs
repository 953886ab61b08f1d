//! Unit tests for migration steps, modules and the orchestrator.

mod state_tests;
mod support;
