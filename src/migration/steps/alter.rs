//! Structural change step.

use super::{StepContext, TaskStep};
use crate::migration::domain::{Reversibility, StepResult};
use crate::store::domain::{Alteration, FieldSpec, IndexSpec};
use async_trait::async_trait;
use tracing::debug;

/// Applies one [`Alteration`] and reverses it with an explicit or derived
/// inverse.
///
/// Adding a field or index derives a drop, and resizing derives the
/// opposite resize. Drops have no derivable inverse and are irreversible
/// unless [`AlterStep::with_inverse`] supplies one.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterStep {
    forward: Alteration,
    inverse: Option<Alteration>,
}

impl AlterStep {
    /// Creates a step with the inverse derived from `forward`.
    #[must_use]
    pub fn new(forward: Alteration) -> Self {
        let inverse = forward.inverse();
        Self { forward, inverse }
    }

    /// Adds a field to `collection`.
    #[must_use]
    pub fn add_field(collection: impl Into<String>, field: FieldSpec) -> Self {
        Self::new(Alteration::AddField {
            collection: collection.into(),
            field,
        })
    }

    /// Drops a field from `collection`.
    #[must_use]
    pub fn drop_field(collection: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(Alteration::DropField {
            collection: collection.into(),
            field: field.into(),
        })
    }

    /// Changes the maximum length of a text field.
    #[must_use]
    pub fn resize_field(
        collection: impl Into<String>,
        field: impl Into<String>,
        from: u32,
        to: u32,
    ) -> Self {
        Self::new(Alteration::ResizeField {
            collection: collection.into(),
            field: field.into(),
            from,
            to,
        })
    }

    /// Adds an index to `collection`.
    #[must_use]
    pub fn add_index(collection: impl Into<String>, index: IndexSpec) -> Self {
        Self::new(Alteration::AddIndex {
            collection: collection.into(),
            index,
        })
    }

    /// Replaces the inverse used by undo.
    #[must_use]
    pub fn with_inverse(mut self, inverse: Alteration) -> Self {
        self.inverse = Some(inverse);
        self
    }

    /// Returns the forward alteration.
    #[must_use]
    pub const fn forward(&self) -> &Alteration {
        &self.forward
    }

    /// Returns the inverse alteration, if any.
    #[must_use]
    pub const fn inverse(&self) -> Option<&Alteration> {
        self.inverse.as_ref()
    }
}

#[async_trait]
impl TaskStep for AlterStep {
    async fn apply(&self, ctx: &StepContext) -> StepResult<()> {
        debug!(task = %ctx.task(), alteration = %self.forward, "applying alteration");
        ctx.store().alter(&self.forward).await?;
        Ok(())
    }

    async fn undo(&self, ctx: &StepContext) -> StepResult<()> {
        let Some(inverse) = &self.inverse else {
            return Ok(());
        };
        debug!(task = %ctx.task(), alteration = %inverse, "reversing alteration");
        ctx.store().alter(inverse).await?;
        Ok(())
    }

    fn reversibility(&self) -> Reversibility {
        if self.inverse.is_some() {
            Reversibility::Reversible
        } else {
            Reversibility::Irreversible
        }
    }
}
