//! Structural changes to persisted collections.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Storage type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Text, optionally bounded in length.
    Text {
        /// Maximum number of characters, if bounded.
        max_len: Option<u32>,
    },
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInteger,
    /// Boolean flag.
    Boolean,
    /// Double-precision float.
    Float,
    /// Structured JSON document.
    Json,
    /// Timestamp with time zone.
    Timestamp,
}

/// Definition of a field added to a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Storage type.
    pub kind: FieldKind,
    /// Whether the field accepts nulls.
    pub nullable: bool,
    /// Value given to existing and newly inserted rows.
    pub default: Option<Value>,
}

impl FieldSpec {
    /// Creates a nullable field without a default.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: true,
            default: None,
        }
    }

    /// Creates a bounded text field.
    #[must_use]
    pub fn text(name: impl Into<String>, max_len: u32) -> Self {
        Self::new(
            name,
            FieldKind::Text {
                max_len: Some(max_len),
            },
        )
    }

    /// Marks the field as non-nullable.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Definition of an index on a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index name.
    pub name: String,
    /// Indexed fields in order.
    pub fields: Vec<String>,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
}

impl IndexSpec {
    /// Creates a non-unique index.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    /// Marks the index as unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// A structural change to one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alteration {
    /// Adds a field.
    AddField {
        /// Target collection.
        collection: String,
        /// Field definition.
        field: FieldSpec,
    },
    /// Removes a field and its data.
    DropField {
        /// Target collection.
        collection: String,
        /// Field name.
        field: String,
    },
    /// Changes the maximum length of a text field.
    ResizeField {
        /// Target collection.
        collection: String,
        /// Field name.
        field: String,
        /// Length before the change.
        from: u32,
        /// Length after the change.
        to: u32,
    },
    /// Adds an index.
    AddIndex {
        /// Target collection.
        collection: String,
        /// Index definition.
        index: IndexSpec,
    },
    /// Removes an index.
    DropIndex {
        /// Target collection.
        collection: String,
        /// Index name.
        index: String,
    },
}

impl Alteration {
    /// Returns the collection the change applies to.
    #[must_use]
    pub fn collection(&self) -> &str {
        match self {
            Self::AddField { collection, .. }
            | Self::DropField { collection, .. }
            | Self::ResizeField { collection, .. }
            | Self::AddIndex { collection, .. }
            | Self::DropIndex { collection, .. } => collection,
        }
    }

    /// Returns the change that reverses this one, when it can be derived.
    ///
    /// Dropping a field or index loses its definition, so those changes
    /// have no derivable inverse.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        match self {
            Self::AddField { collection, field } => Some(Self::DropField {
                collection: collection.clone(),
                field: field.name.clone(),
            }),
            Self::ResizeField {
                collection,
                field,
                from,
                to,
            } => Some(Self::ResizeField {
                collection: collection.clone(),
                field: field.clone(),
                from: *to,
                to: *from,
            }),
            Self::AddIndex { collection, index } => Some(Self::DropIndex {
                collection: collection.clone(),
                index: index.name.clone(),
            }),
            Self::DropField { .. } | Self::DropIndex { .. } => None,
        }
    }
}

impl fmt::Display for Alteration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddField { collection, field } => {
                write!(f, "add field {collection}.{}", field.name)
            }
            Self::DropField { collection, field } => write!(f, "drop field {collection}.{field}"),
            Self::ResizeField {
                collection,
                field,
                from,
                to,
            } => write!(f, "resize field {collection}.{field} from {from} to {to}"),
            Self::AddIndex { collection, index } => {
                write!(f, "add index {} on {collection}", index.name)
            }
            Self::DropIndex { collection, index } => {
                write!(f, "drop index {index} on {collection}")
            }
        }
    }
}
