//! Error types for version graph construction and path resolution.

use super::VersionId;
use thiserror::Error;

/// Errors returned while building version graphs or resolving paths.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionGraphError {
    /// The version token is empty after trimming.
    #[error("invalid version identifier '{0}'")]
    InvalidVersion(String),

    /// A `from` version was given more than one successor.
    #[error("version {from} already leads to {existing}, refusing a second edge to {proposed}")]
    DuplicateEdge {
        /// Version with the conflicting outgoing edges.
        from: VersionId,
        /// Successor registered first.
        existing: VersionId,
        /// Successor that was rejected.
        proposed: VersionId,
    },

    /// The starting version is neither a graph key nor the newest version.
    #[error("unknown version {0}")]
    UnknownVersion(VersionId),

    /// The requested target is never reached from the starting version.
    #[error("no migration path from {from} to {target}")]
    NoPathFound {
        /// Starting version of the walk.
        from: VersionId,
        /// Requested target version.
        target: VersionId,
    },

    /// The walk revisited a version.
    #[error("cycle detected walking from {start}: version {revisited} visited twice")]
    CycleDetected {
        /// Version the walk started from.
        start: VersionId,
        /// First version seen a second time.
        revisited: VersionId,
    },

    /// A serialized graph definition could not be decoded.
    #[error("invalid version graph definition: {0}")]
    Definition(String),
}
