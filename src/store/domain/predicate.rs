//! Composable row filters.

use super::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Row filter built from equality, inequality and membership tests.
///
/// Comparisons follow SQL semantics for nulls: an equality test against
/// [`Value::Null`] matches missing or null fields, an inequality test never
/// matches a null field, and membership never matches null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Matches every row.
    #[default]
    All,
    /// Field equals the value.
    Eq {
        /// Field name.
        field: String,
        /// Expected value.
        value: Value,
    },
    /// Field is non-null and differs from the value.
    Ne {
        /// Field name.
        field: String,
        /// Excluded value.
        value: Value,
    },
    /// Field equals one of the values.
    In {
        /// Field name.
        field: String,
        /// Accepted values.
        values: Vec<Value>,
    },
    /// Every clause matches. An empty group matches everything.
    And {
        /// Grouped clauses.
        clauses: Vec<Self>,
    },
    /// At least one clause matches. An empty group matches nothing.
    Or {
        /// Grouped clauses.
        clauses: Vec<Self>,
    },
}

impl Predicate {
    /// Creates a filter matching every row.
    #[must_use]
    pub const fn all() -> Self {
        Self::All
    }

    /// Creates an equality test.
    #[must_use]
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates an inequality test.
    #[must_use]
    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Ne {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a membership test.
    #[must_use]
    pub fn is_in<V>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<Value>,
    {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Combines two filters with AND, flattening nested groups.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let mut clauses = match self {
            Self::And { clauses } => clauses,
            Self::All => Vec::new(),
            single => vec![single],
        };
        match other {
            Self::And { clauses: more } => clauses.extend(more),
            Self::All => {}
            single => clauses.push(single),
        }
        Self::And { clauses }
    }

    /// Combines two filters with OR, flattening nested groups.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let mut clauses = match self {
            Self::Or { clauses } => clauses,
            single => vec![single],
        };
        match other {
            Self::Or { clauses: more } => clauses.extend(more),
            single => clauses.push(single),
        }
        Self::Or { clauses }
    }

    /// Evaluates the filter against a record.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::All => true,
            Self::Eq { field, value } => {
                let actual = record.get(field).unwrap_or(&Value::Null);
                actual == value
            }
            Self::Ne { field, value } => match record.get(field) {
                None | Some(Value::Null) => false,
                Some(actual) => actual != value,
            },
            Self::In { field, values } => match record.get(field) {
                None | Some(Value::Null) => false,
                Some(actual) => values.contains(actual),
            },
            Self::And { clauses } => clauses.iter().all(|clause| clause.matches(record)),
            Self::Or { clauses } => clauses.iter().any(|clause| clause.matches(record)),
        }
    }
}
