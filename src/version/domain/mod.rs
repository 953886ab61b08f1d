//! Domain model for version graphs and migration paths.
//!
//! Version identifiers are opaque tokens. Their order comes exclusively from
//! graph edges, never from lexical or semantic-version comparison.

mod definition;
mod error;
mod graph;
mod ids;
mod path;

pub use definition::{EdgeDefinition, GraphDefinition};
pub use error::VersionGraphError;
pub use graph::{GraphFingerprint, VersionGraph, VersionGraphBuilder};
pub use ids::VersionId;
pub use path::{MigrationPath, Target};
