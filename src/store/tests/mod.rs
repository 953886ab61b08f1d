//! Unit tests for store domain types and the in-memory adapter.

mod alteration_tests;
