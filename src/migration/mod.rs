//! Version-sequenced migration engine.
//!
//! For every version on a resolved [`crate::version::domain::MigrationPath`]
//! the orchestrator builds a fresh [`services::VersionModule`], applies its
//! task steps in declaration order and, when one fails, unwinds the steps
//! already applied in reverse order before halting the run.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Reusable step kinds in [`steps`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
pub mod steps;

#[cfg(test)]
mod tests;
