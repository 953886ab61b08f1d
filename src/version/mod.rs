//! Version lineage for installations.
//!
//! A [`domain::VersionGraph`] records the single forward successor of every
//! known version. The path resolver walks that chain from an installation's
//! current version to the requested target and yields the ordered list of
//! versions whose migrations must run.
//!
//! - Domain types in [`domain`]

pub mod domain;

#[cfg(test)]
mod tests;
