//! Serialized form of a version graph.
//!
//! Release tooling ships the lineage as JSON:
//!
//! ```json
//! { "edges": [ { "from": "1.0", "to": "1.1" }, { "from": "1.1", "to": "1.2" } ] }
//! ```

use super::{VersionGraph, VersionGraphError, VersionId};
use serde::{Deserialize, Serialize};

/// Serializable description of a version graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphDefinition {
    /// Edges in declaration order.
    pub edges: Vec<EdgeDefinition>,
}

/// One serialized `from -> to` edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeDefinition {
    /// Version the edge leaves.
    pub from: VersionId,
    /// Immediate successor.
    pub to: VersionId,
}

impl VersionGraph {
    /// Builds a graph from its serialized description.
    ///
    /// # Errors
    ///
    /// Returns [`VersionGraphError::DuplicateEdge`] when two edges share a
    /// `from` version.
    pub fn from_definition(definition: GraphDefinition) -> Result<Self, VersionGraphError> {
        Self::from_edges(
            definition
                .edges
                .into_iter()
                .map(|edge| (edge.from, edge.to)),
        )
    }

    /// Parses a JSON graph definition and rejects cyclic lineages.
    ///
    /// # Errors
    ///
    /// Returns [`VersionGraphError::Definition`] for malformed JSON or empty
    /// version tokens, plus any construction or cycle error.
    pub fn from_json_str(raw: &str) -> Result<Self, VersionGraphError> {
        let definition: GraphDefinition = serde_json::from_str(raw)
            .map_err(|err| VersionGraphError::Definition(err.to_string()))?;
        let graph = Self::from_definition(definition)?;
        graph.validate_acyclic()?;
        Ok(graph)
    }

    /// Returns the serializable description of this graph, sorted by `from`.
    #[must_use]
    pub fn to_definition(&self) -> GraphDefinition {
        GraphDefinition {
            edges: self
                .edges()
                .into_iter()
                .map(|(from, to)| EdgeDefinition {
                    from: from.clone(),
                    to: to.clone(),
                })
                .collect(),
        }
    }
}
