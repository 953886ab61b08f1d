//! Dual-mode task steps and the reusable step kinds.
//!
//! Every step can apply its change and undo it. The orchestrator calls
//! [`TaskStep::apply`] once per successful run and [`TaskStep::undo`] at
//! most once per apply, only while rolling back the version that owns the
//! step. Steps reporting [`Reversibility::Irreversible`] have a no-op undo.

mod alter;
mod config;
mod context;
mod rewrite;
mod statement;

pub use alter::AlterStep;
pub use config::{ConfigChange, ConfigStep};
pub use context::{Collaborators, StepContext};
pub use rewrite::{FieldTransform, RewriteStep};
pub use statement::StatementStep;

use crate::migration::domain::{Reversibility, StepResult};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Named unit of migration work with a compensating undo.
#[async_trait]
pub trait TaskStep: Send + Sync {
    /// Applies the change.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::migration::domain::StepError`] describing why the
    /// change could not be applied.
    async fn apply(&self, ctx: &StepContext) -> StepResult<()>;

    /// Reverses a previously applied change.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::migration::domain::StepError`] describing why the
    /// change could not be reversed.
    async fn undo(&self, ctx: &StepContext) -> StepResult<()>;

    /// Reports whether [`Self::undo`] actually reverses [`Self::apply`].
    ///
    /// Rollback calls `undo` regardless. An irreversible step's undo should
    /// be a no-op, and a successful call is reported as irreversible rather
    /// than undone.
    fn reversibility(&self) -> Reversibility {
        Reversibility::Reversible
    }
}

/// Step held by a version module.
#[derive(Clone)]
pub enum MigrationTask {
    /// Structural change to a collection.
    Alter(AlterStep),
    /// Raw statements rendered from templates.
    Statement(StatementStep),
    /// Field rewrite over selected rows.
    Rewrite(RewriteStep),
    /// Configuration patch.
    Config(ConfigStep),
    /// Application-defined step.
    Custom(Arc<dyn TaskStep>),
}

impl MigrationTask {
    /// Wraps an application-defined step.
    #[must_use]
    pub fn custom(step: impl TaskStep + 'static) -> Self {
        Self::Custom(Arc::new(step))
    }

    /// Returns a short label for the step kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Alter(_) => "alter",
            Self::Statement(_) => "statement",
            Self::Rewrite(_) => "rewrite",
            Self::Config(_) => "config",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for MigrationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alter(step) => f.debug_tuple("Alter").field(step).finish(),
            Self::Statement(step) => f.debug_tuple("Statement").field(step).finish(),
            Self::Rewrite(step) => f.debug_tuple("Rewrite").field(step).finish(),
            Self::Config(step) => f.debug_tuple("Config").field(step).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<AlterStep> for MigrationTask {
    fn from(step: AlterStep) -> Self {
        Self::Alter(step)
    }
}

impl From<StatementStep> for MigrationTask {
    fn from(step: StatementStep) -> Self {
        Self::Statement(step)
    }
}

impl From<RewriteStep> for MigrationTask {
    fn from(step: RewriteStep) -> Self {
        Self::Rewrite(step)
    }
}

impl From<ConfigStep> for MigrationTask {
    fn from(step: ConfigStep) -> Self {
        Self::Config(step)
    }
}

impl From<Arc<dyn TaskStep>> for MigrationTask {
    fn from(step: Arc<dyn TaskStep>) -> Self {
        Self::Custom(step)
    }
}

#[async_trait]
impl TaskStep for MigrationTask {
    async fn apply(&self, ctx: &StepContext) -> StepResult<()> {
        match self {
            Self::Alter(step) => step.apply(ctx).await,
            Self::Statement(step) => step.apply(ctx).await,
            Self::Rewrite(step) => step.apply(ctx).await,
            Self::Config(step) => step.apply(ctx).await,
            Self::Custom(step) => step.apply(ctx).await,
        }
    }

    async fn undo(&self, ctx: &StepContext) -> StepResult<()> {
        match self {
            Self::Alter(step) => step.undo(ctx).await,
            Self::Statement(step) => step.undo(ctx).await,
            Self::Rewrite(step) => step.undo(ctx).await,
            Self::Config(step) => step.undo(ctx).await,
            Self::Custom(step) => step.undo(ctx).await,
        }
    }

    fn reversibility(&self) -> Reversibility {
        match self {
            Self::Alter(step) => step.reversibility(),
            Self::Statement(step) => step.reversibility(),
            Self::Rewrite(step) => step.reversibility(),
            Self::Config(step) => step.reversibility(),
            Self::Custom(step) => step.reversibility(),
        }
    }
}
