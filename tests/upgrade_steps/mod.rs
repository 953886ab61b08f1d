//! Step definitions for upgrade behaviour scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
