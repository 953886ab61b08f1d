//! Store-agnostic descriptions of structural changes, filters and records.

mod alteration;
mod predicate;

pub use alteration::{Alteration, FieldKind, FieldSpec, IndexSpec};
pub use predicate::Predicate;

/// A single row, keyed by field name.
pub type Record = serde_json::Map<String, serde_json::Value>;
