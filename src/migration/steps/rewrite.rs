//! Field rewrite step over selected rows.

use super::{StepContext, TaskStep};
use crate::migration::domain::{Reversibility, StepError, StepResult};
use crate::store::domain::{Predicate, Record};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Computes the new value of a field from the whole row.
pub type FieldTransform = Arc<dyn Fn(&Record) -> StepResult<Value> + Send + Sync>;

#[derive(Clone)]
struct Pass {
    filter: Predicate,
    transform: FieldTransform,
}

/// Rewrites one field of every selected row.
///
/// Rows are addressed by a key field when written back, so the key must be
/// non-null and unique within the collection. Rows with a null or repeated
/// key fail the step before anything is written. Only rows whose computed
/// value differs from the stored one are written, so applying the step
/// twice on stable input performs no further writes.
#[derive(Clone)]
pub struct RewriteStep {
    collection: String,
    key: String,
    field: String,
    forward: Pass,
    reverse: Option<Pass>,
}

impl RewriteStep {
    /// Creates a step rewriting `field` on every row of `collection`.
    #[must_use]
    pub fn new<F>(
        collection: impl Into<String>,
        key: impl Into<String>,
        field: impl Into<String>,
        transform: F,
    ) -> Self
    where
        F: Fn(&Record) -> StepResult<Value> + Send + Sync + 'static,
    {
        Self {
            collection: collection.into(),
            key: key.into(),
            field: field.into(),
            forward: Pass {
                filter: Predicate::all(),
                transform: Arc::new(transform),
            },
            reverse: None,
        }
    }

    /// Restricts the forward rewrite to rows matching `filter`.
    #[must_use]
    pub fn filter(mut self, filter: Predicate) -> Self {
        self.forward.filter = filter;
        self
    }

    /// Makes the step reversible with a rewrite over rows matching
    /// `filter`.
    #[must_use]
    pub fn with_reverse<F>(mut self, filter: Predicate, transform: F) -> Self
    where
        F: Fn(&Record) -> StepResult<Value> + Send + Sync + 'static,
    {
        self.reverse = Some(Pass {
            filter,
            transform: Arc::new(transform),
        });
        self
    }

    async fn rewrite(&self, pass: &Pass, ctx: &StepContext) -> StepResult<u64> {
        let store = ctx.store();
        let rows = store.select(&self.collection, &pass.filter).await?;
        let pending = self.plan(pass, &rows)?;

        let mut written = 0_u64;
        for (key, next) in pending {
            let mut changes = Record::new();
            changes.insert(self.field.clone(), next);
            let count = store
                .update(
                    &self.collection,
                    &Predicate::equals(self.key.clone(), key.clone()),
                    &changes,
                )
                .await?;
            if count > 1 {
                return Err(StepError::failed(format!(
                    "key {key} of {}.{} addressed {count} rows",
                    self.collection, self.key
                )));
            }
            written += count;
        }
        debug!(
            task = %ctx.task(),
            collection = %self.collection,
            selected = rows.len(),
            written,
            "rewrote field"
        );
        Ok(written)
    }

    /// Computes the changed values and checks every selected row has a
    /// distinct, non-null key before anything is written.
    fn plan(&self, pass: &Pass, rows: &[Record]) -> StepResult<Vec<(Value, Value)>> {
        let mut keys = BTreeSet::new();
        let mut pending = Vec::new();
        for row in rows {
            let key = match row.get(&self.key) {
                None | Some(Value::Null) => {
                    return Err(StepError::failed(format!(
                        "row in {} has no value for key field {}",
                        self.collection, self.key
                    )));
                }
                Some(key) => key,
            };
            if !keys.insert(key.to_string()) {
                return Err(StepError::failed(format!(
                    "key {key} of {}.{} is not unique",
                    self.collection, self.key
                )));
            }
            let next = (pass.transform)(row)?;
            let current = row.get(&self.field).unwrap_or(&Value::Null);
            if *current != next {
                pending.push((key.clone(), next));
            }
        }
        Ok(pending)
    }
}

impl fmt::Debug for RewriteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewriteStep")
            .field("collection", &self.collection)
            .field("key", &self.key)
            .field("field", &self.field)
            .field("filter", &self.forward.filter)
            .field("reversible", &self.reverse.is_some())
            .finish()
    }
}

#[async_trait]
impl TaskStep for RewriteStep {
    async fn apply(&self, ctx: &StepContext) -> StepResult<()> {
        self.rewrite(&self.forward, ctx).await?;
        Ok(())
    }

    async fn undo(&self, ctx: &StepContext) -> StepResult<()> {
        if let Some(reverse) = &self.reverse {
            self.rewrite(reverse, ctx).await?;
        }
        Ok(())
    }

    fn reversibility(&self) -> Reversibility {
        if self.reverse.is_some() {
            Reversibility::Reversible
        } else {
            Reversibility::Irreversible
        }
    }
}
