//! SQL rendering for the `PostgreSQL` store adapter.
//!
//! Predicates compare the text form of a column with bound text parameters,
//! so every bound value travels as `TEXT`. Record payloads travel as a
//! single JSON parameter decoded server-side with `jsonb_populate_record`.

use crate::store::domain::{Alteration, FieldKind, FieldSpec, IndexSpec, Predicate, Record};
use serde_json::Value;

/// Alias used for the target table in row-level statements.
const ROW_ALIAS: &str = "t";

/// A rendered statement with its positional text parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SqlStatement {
    pub(super) sql: String,
    pub(super) binds: Vec<String>,
}

/// Quotes an identifier, splitting schema-qualified names on `.`.
pub(super) fn quote_ident(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Renders a JSON value as an inline SQL literal for column defaults.
pub(super) fn render_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_owned(),
        Value::Bool(true) => "TRUE".to_owned(),
        Value::Bool(false) => "FALSE".to_owned(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => quote_literal(text),
        Value::Array(_) | Value::Object(_) => {
            format!("{}::jsonb", quote_literal(&value.to_string()))
        }
    }
}

/// Text form of a value as `PostgreSQL` prints it for comparison.
fn bind_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn column_type(kind: FieldKind) -> String {
    match kind {
        FieldKind::Text { max_len: Some(len) } => format!("VARCHAR({len})"),
        FieldKind::Text { max_len: None } => "TEXT".to_owned(),
        FieldKind::Integer => "INTEGER".to_owned(),
        FieldKind::BigInteger => "BIGINT".to_owned(),
        FieldKind::Boolean => "BOOLEAN".to_owned(),
        FieldKind::Float => "DOUBLE PRECISION".to_owned(),
        FieldKind::Json => "JSONB".to_owned(),
        FieldKind::Timestamp => "TIMESTAMPTZ".to_owned(),
    }
}

fn column_definition(field: &FieldSpec) -> String {
    let mut definition = format!("{} {}", quote_ident(&field.name), column_type(field.kind));
    if !field.nullable {
        definition.push_str(" NOT NULL");
    }
    if let Some(default) = &field.default {
        definition.push_str(" DEFAULT ");
        definition.push_str(&render_literal(default));
    }
    definition
}

fn index_definition(collection: &str, index: &IndexSpec) -> String {
    let columns = index
        .fields
        .iter()
        .map(|field| quote_ident(field))
        .collect::<Vec<_>>()
        .join(", ");
    let unique = if index.unique { "UNIQUE " } else { "" };
    format!(
        "CREATE {unique}INDEX {} ON {} ({columns})",
        quote_ident(&index.name),
        quote_ident(collection)
    )
}

/// Renders a structural change as DDL.
pub(super) fn alteration_sql(alteration: &Alteration) -> String {
    let table = quote_ident(alteration.collection());
    match alteration {
        Alteration::AddField { field, .. } => {
            format!("ALTER TABLE {table} ADD COLUMN {}", column_definition(field))
        }
        Alteration::DropField { field, .. } => {
            format!("ALTER TABLE {table} DROP COLUMN {}", quote_ident(field))
        }
        Alteration::ResizeField { field, to, .. } => format!(
            "ALTER TABLE {table} ALTER COLUMN {} TYPE VARCHAR({to})",
            quote_ident(field)
        ),
        Alteration::AddIndex { collection, index } => index_definition(collection, index),
        Alteration::DropIndex { index, .. } => format!("DROP INDEX {}", quote_ident(index)),
    }
}

fn next_placeholder(binds: &mut Vec<String>, value: String) -> String {
    binds.push(value);
    format!("${}", binds.len())
}

fn qualified_column(field: &str) -> String {
    format!("{ROW_ALIAS}.{}::text", quote_ident(field))
}

/// Renders a predicate as a `WHERE` expression, appending its parameters.
pub(super) fn render_predicate(predicate: &Predicate, binds: &mut Vec<String>) -> String {
    match predicate {
        Predicate::All => "TRUE".to_owned(),
        Predicate::Eq {
            field,
            value: Value::Null,
        } => format!("{} IS NULL", qualified_column(field)),
        Predicate::Eq { field, value } => {
            let placeholder = next_placeholder(binds, bind_text(value));
            format!("{} = {placeholder}", qualified_column(field))
        }
        Predicate::Ne {
            field,
            value: Value::Null,
        } => format!("{} IS NOT NULL", qualified_column(field)),
        Predicate::Ne { field, value } => {
            let placeholder = next_placeholder(binds, bind_text(value));
            format!("{} <> {placeholder}", qualified_column(field))
        }
        Predicate::In { values, .. } if values.iter().all(Value::is_null) => "FALSE".to_owned(),
        Predicate::In { field, values } => {
            let placeholders = values
                .iter()
                .filter(|value| !value.is_null())
                .map(|value| next_placeholder(binds, bind_text(value)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} IN ({placeholders})", qualified_column(field))
        }
        Predicate::And { clauses } => render_group(clauses, " AND ", "TRUE", binds),
        Predicate::Or { clauses } => render_group(clauses, " OR ", "FALSE", binds),
    }
}

fn render_group(
    clauses: &[Predicate],
    separator: &str,
    empty: &str,
    binds: &mut Vec<String>,
) -> String {
    if clauses.is_empty() {
        return empty.to_owned();
    }
    let rendered = clauses
        .iter()
        .map(|clause| render_predicate(clause, binds))
        .collect::<Vec<_>>()
        .join(separator);
    format!("({rendered})")
}

/// Renders a filtered select returning each row as one JSONB value.
pub(super) fn select_sql(collection: &str, filter: &Predicate) -> SqlStatement {
    let mut binds = Vec::new();
    let condition = render_predicate(filter, &mut binds);
    SqlStatement {
        sql: format!(
            "SELECT to_jsonb({ROW_ALIAS}) AS record FROM {} AS {ROW_ALIAS} WHERE {condition}",
            quote_ident(collection)
        ),
        binds,
    }
}

/// Renders a filtered update taking new values from a JSON parameter.
pub(super) fn update_sql(collection: &str, filter: &Predicate, changes: &Record) -> SqlStatement {
    let table = quote_ident(collection);
    let mut binds = vec![Value::Object(changes.clone()).to_string()];
    let assignments = changes
        .keys()
        .map(|field| {
            let column = quote_ident(field);
            format!("{column} = src.{column}")
        })
        .collect::<Vec<_>>()
        .join(", ");
    let condition = render_predicate(filter, &mut binds);
    SqlStatement {
        sql: format!(
            "UPDATE {table} AS {ROW_ALIAS} SET {assignments} \
             FROM jsonb_populate_record(NULL::{table}, $1::jsonb) AS src WHERE {condition}"
        ),
        binds,
    }
}

/// Renders an insert of the record's fields, leaving others to defaults.
pub(super) fn insert_sql(collection: &str, record: &Record) -> SqlStatement {
    let table = quote_ident(collection);
    let columns = record
        .keys()
        .map(|field| quote_ident(field))
        .collect::<Vec<_>>()
        .join(", ");
    SqlStatement {
        sql: format!(
            "INSERT INTO {table} ({columns}) SELECT {columns} \
             FROM jsonb_populate_record(NULL::{table}, $1::jsonb)"
        ),
        binds: vec![Value::Object(record.clone()).to_string()],
    }
}

/// Renders a filtered delete.
pub(super) fn delete_sql(collection: &str, filter: &Predicate) -> SqlStatement {
    let mut binds = Vec::new();
    let condition = render_predicate(filter, &mut binds);
    SqlStatement {
        sql: format!(
            "DELETE FROM {} AS {ROW_ALIAS} WHERE {condition}",
            quote_ident(collection)
        ),
        binds,
    }
}
