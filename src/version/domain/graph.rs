//! Forward-chain version graph.

use super::{VersionGraphError, VersionId};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Mapping from each known version to its immediate successor.
///
/// Every `from` version has at most one successor, so the graph is a set of
/// simple forward chains. Cycles cannot be ruled out by construction; they
/// are reported by [`VersionGraph::validate_acyclic`] and during path
/// resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionGraph {
    edges: HashMap<VersionId, VersionId>,
}

impl VersionGraph {
    /// Starts building a graph from raw version tokens.
    #[must_use]
    pub fn builder() -> VersionGraphBuilder {
        VersionGraphBuilder::default()
    }

    /// Creates a graph from validated edges.
    ///
    /// # Errors
    ///
    /// Returns [`VersionGraphError::DuplicateEdge`] when a `from` version
    /// appears twice.
    pub fn from_edges(
        edges: impl IntoIterator<Item = (VersionId, VersionId)>,
    ) -> Result<Self, VersionGraphError> {
        let mut graph = Self::default();
        for (from, to) in edges {
            if let Some(existing) = graph.edges.get(&from) {
                return Err(VersionGraphError::DuplicateEdge {
                    existing: existing.clone(),
                    from,
                    proposed: to,
                });
            }
            graph.edges.insert(from, to);
        }
        Ok(graph)
    }

    /// Returns the immediate successor of `version`, if any.
    #[must_use]
    pub fn successor(&self, version: &VersionId) -> Option<&VersionId> {
        self.edges.get(version)
    }

    /// Returns `true` when the version appears anywhere in the graph.
    #[must_use]
    pub fn contains(&self, version: &VersionId) -> bool {
        self.edges.contains_key(version) || self.edges.values().any(|to| to == version)
    }

    /// Returns `true` when the version is known but has no successor.
    ///
    /// Terminal versions are the newest known versions of their chain.
    #[must_use]
    pub fn is_terminal(&self, version: &VersionId) -> bool {
        !self.edges.contains_key(version) && self.edges.values().any(|to| to == version)
    }

    /// Returns every terminal version, sorted by identifier text.
    #[must_use]
    pub fn terminals(&self) -> Vec<&VersionId> {
        let mut terminals: Vec<&VersionId> = self
            .edges
            .values()
            .filter(|to| !self.edges.contains_key(*to))
            .collect();
        terminals.sort_by(|left, right| left.as_str().cmp(right.as_str()));
        terminals.dedup();
        terminals
    }

    /// Returns the edges as `(from, to)` pairs, sorted by `from`.
    #[must_use]
    pub fn edges(&self) -> Vec<(&VersionId, &VersionId)> {
        let mut edges: Vec<_> = self.edges.iter().collect();
        edges.sort_by(|(left, _), (right, _)| left.as_str().cmp(right.as_str()));
        edges
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` when the graph has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Checks that no chain in the graph loops back on itself.
    ///
    /// # Errors
    ///
    /// Returns [`VersionGraphError::CycleDetected`] naming the first version
    /// that a walk revisits.
    pub fn validate_acyclic(&self) -> Result<(), VersionGraphError> {
        let mut settled: HashSet<&VersionId> = HashSet::new();
        for (start, _) in self.edges() {
            let mut trail: HashSet<&VersionId> = HashSet::new();
            let mut cursor = start;
            loop {
                if settled.contains(cursor) {
                    break;
                }
                if !trail.insert(cursor) {
                    return Err(VersionGraphError::CycleDetected {
                        start: start.clone(),
                        revisited: cursor.clone(),
                    });
                }
                match self.edges.get(cursor) {
                    Some(next) => cursor = next,
                    None => break,
                }
            }
            settled.extend(trail);
        }
        Ok(())
    }

    /// Computes a stable SHA-256 fingerprint of the edge set.
    ///
    /// Two graphs with the same edges always share a fingerprint regardless
    /// of insertion order.
    #[must_use]
    pub fn fingerprint(&self) -> GraphFingerprint {
        let mut hasher = Sha256::new();
        for (from, to) in self.edges() {
            hasher.update(from.as_str().as_bytes());
            hasher.update([0x1f]);
            hasher.update(to.as_str().as_bytes());
            hasher.update([0x1e]);
        }
        let hex = hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect();
        GraphFingerprint(hex)
    }
}

/// Hex-encoded SHA-256 digest of a version graph's edges.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphFingerprint(String);

impl GraphFingerprint {
    /// Returns the hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GraphFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builder collecting raw edges before validation.
#[derive(Debug, Clone, Default)]
pub struct VersionGraphBuilder {
    edges: Vec<(String, String)>,
}

impl VersionGraphBuilder {
    /// Adds an edge from `from` to its successor `to`.
    #[must_use]
    pub fn edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Validates the collected edges and builds the graph.
    ///
    /// # Errors
    ///
    /// Returns [`VersionGraphError::InvalidVersion`] for empty tokens and
    /// [`VersionGraphError::DuplicateEdge`] for repeated `from` versions.
    pub fn build(self) -> Result<VersionGraph, VersionGraphError> {
        let validated = self
            .edges
            .into_iter()
            .map(|(from, to)| Ok((VersionId::new(from)?, VersionId::new(to)?)))
            .collect::<Result<Vec<_>, VersionGraphError>>()?;
        VersionGraph::from_edges(validated)
    }
}
