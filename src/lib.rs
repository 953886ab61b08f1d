//! Stepladder: version-sequenced schema and data migration orchestrator.
//!
//! Given an installation's current version and a target, the orchestrator
//! walks a version graph, and for each intervening version applies an
//! ordered set of named task steps against the persistent store and the
//! configuration. When a step fails, the steps already applied for that
//! version are undone in reverse order and the run halts.
//!
//! # Architecture
//!
//! Stepladder follows hexagonal architecture principles:
//!
//! - **Domain**: Pure migration logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the store, configuration and
//!   journal collaborators
//! - **Adapters**: Concrete implementations of ports (in-memory,
//!   `PostgreSQL`, JSON files)
//!
//! # Modules
//!
//! - [`version`]: Version identifiers, graphs and path resolution
//! - [`store`]: Store port, alterations, predicates and adapters
//! - [`config`]: Configuration port and adapters
//! - [`migration`]: Task steps, version modules and the orchestrator

pub mod config;
pub mod migration;
pub mod store;
pub mod version;
