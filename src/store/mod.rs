//! Persistent store collaborator used by migration steps.
//!
//! Steps never talk to a database directly. They issue structural
//! alterations, predicate-filtered row operations and raw statements through
//! the [`ports::DataStore`] port:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
