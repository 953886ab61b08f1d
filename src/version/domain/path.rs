//! Path resolution over a version graph.

use super::{VersionGraph, VersionGraphError, VersionId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, instrument};

/// Destination of an upgrade run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "version", rename_all = "snake_case")]
pub enum Target {
    /// Walk until the graph has no further edge.
    #[default]
    Latest,
    /// Stop once the given version has been reached.
    Version(VersionId),
}

impl Target {
    /// Returns `true` when `version` is the requested stopping point.
    #[must_use]
    pub fn is_reached_by(&self, version: &VersionId) -> bool {
        match self {
            Self::Latest => false,
            Self::Version(target) => target == version,
        }
    }
}

impl From<VersionId> for Target {
    fn from(value: VersionId) -> Self {
        Self::Version(value)
    }
}

impl From<Option<VersionId>> for Target {
    fn from(value: Option<VersionId>) -> Self {
        value.map_or(Self::Latest, Self::Version)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Version(version) => write!(f, "{version}"),
        }
    }
}

/// Ordered, duplicate-free list of versions to pass through in one run.
///
/// The starting version is not part of the path; the first entry is the
/// first version whose migrations run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MigrationPath {
    versions: Vec<VersionId>,
}

impl MigrationPath {
    /// Returns the versions in traversal order.
    #[must_use]
    pub fn versions(&self) -> &[VersionId] {
        &self.versions
    }

    /// Returns the final version of the path, if any.
    #[must_use]
    pub fn last(&self) -> Option<&VersionId> {
        self.versions.last()
    }

    /// Returns the number of versions in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Returns `true` when there is nothing to migrate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Iterates over versions in traversal order.
    pub fn iter(&self) -> std::slice::Iter<'_, VersionId> {
        self.versions.iter()
    }

    /// Consumes the path, returning its versions.
    #[must_use]
    pub fn into_versions(self) -> Vec<VersionId> {
        self.versions
    }
}

impl<'a> IntoIterator for &'a MigrationPath {
    type Item = &'a VersionId;
    type IntoIter = std::slice::Iter<'a, VersionId>;

    fn into_iter(self) -> Self::IntoIter {
        self.versions.iter()
    }
}

impl VersionGraph {
    /// Resolves the ordered list of versions between `current` and `target`.
    ///
    /// The walk follows successor edges from `current`, appending each
    /// successor, and stops at a version without a successor or at the
    /// requested target. An installation already at the newest version of
    /// its chain yields an empty path.
    ///
    /// # Errors
    ///
    /// - [`VersionGraphError::UnknownVersion`] when `current` is neither a
    ///   graph key nor a terminal version.
    /// - [`VersionGraphError::NoPathFound`] when a specific target is never
    ///   reached.
    /// - [`VersionGraphError::CycleDetected`] when the walk revisits a
    ///   version.
    #[instrument(
        level = "debug",
        skip(self, current, target),
        fields(current = %current, target = %target)
    )]
    pub fn resolve_path(
        &self,
        current: &VersionId,
        target: &Target,
    ) -> Result<MigrationPath, VersionGraphError> {
        if !self.contains(current) {
            return Err(VersionGraphError::UnknownVersion(current.clone()));
        }
        if target.is_reached_by(current) {
            return Ok(MigrationPath::default());
        }

        if self.successor(current).is_none() {
            return match target {
                Target::Latest => Ok(MigrationPath::default()),
                Target::Version(requested) => Err(VersionGraphError::NoPathFound {
                    from: current.clone(),
                    target: requested.clone(),
                }),
            };
        }

        let mut visited: HashSet<&VersionId> = HashSet::from([current]);
        let mut versions = Vec::new();
        let mut cursor = current;
        while let Some(next) = self.successor(cursor) {
            if !visited.insert(next) {
                return Err(VersionGraphError::CycleDetected {
                    start: current.clone(),
                    revisited: next.clone(),
                });
            }
            versions.push(next.clone());
            if target.is_reached_by(next) {
                debug!(steps = versions.len(), "reached requested target");
                return Ok(MigrationPath { versions });
            }
            cursor = next;
        }

        match target {
            Target::Latest => {
                debug!(steps = versions.len(), "reached latest known version");
                Ok(MigrationPath { versions })
            }
            Target::Version(requested) => Err(VersionGraphError::NoPathFound {
                from: current.clone(),
                target: requested.clone(),
            }),
        }
    }
}
