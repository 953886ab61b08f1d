//! Configuration collaborator used by migration steps.
//!
//! Settings live in named sources, each a flat map of string keys to string
//! values. Steps read and patch them through the [`ports::ConfigStore`]
//! port, which keeps configuration access injected rather than global:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
