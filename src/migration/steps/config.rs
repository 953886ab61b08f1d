//! Configuration patch step.

use super::{StepContext, TaskStep};
use crate::migration::domain::{Reversibility, StepResult};
use async_trait::async_trait;
use tracing::{debug, info};

/// Change applied to the configuration collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigChange {
    /// Sets a key, optionally restoring a declared previous value on undo.
    Set {
        /// Source name.
        source: String,
        /// Setting key.
        key: String,
        /// New value.
        value: String,
        /// Value written back on undo.
        previous: Option<String>,
    },
    /// Writes a key only when it is absent.
    AddIfAbsent {
        /// Source name.
        source: String,
        /// Setting key.
        key: String,
        /// Value to add.
        value: String,
    },
    /// Copies missing keys from a defaults source into a current source.
    MergeDefaults {
        /// Source providing defaults.
        defaults: String,
        /// Source receiving missing keys.
        current: String,
    },
}

/// Applies one [`ConfigChange`].
///
/// Only a set with a declared previous value is reversible. Additions and
/// merges cannot tell which keys existed before, so their undo is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStep {
    change: ConfigChange,
}

impl ConfigStep {
    /// Sets `key` in `source` to `value`.
    ///
    /// The step does not capture the value it overwrites. Without
    /// [`Self::restoring`] it is irreversible and undo leaves `value` in
    /// place.
    #[must_use]
    pub fn set(
        source: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            change: ConfigChange::Set {
                source: source.into(),
                key: key.into(),
                value: value.into(),
                previous: None,
            },
        }
    }

    /// Declares the value restored on undo. Ignored for changes other than
    /// [`ConfigChange::Set`].
    #[must_use]
    pub fn restoring(mut self, value: impl Into<String>) -> Self {
        if let ConfigChange::Set { previous, .. } = &mut self.change {
            *previous = Some(value.into());
        }
        self
    }

    /// Adds `key` to `source` unless it is already present.
    #[must_use]
    pub fn add_if_absent(
        source: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            change: ConfigChange::AddIfAbsent {
                source: source.into(),
                key: key.into(),
                value: value.into(),
            },
        }
    }

    /// Merges keys missing from `current` out of `defaults`.
    #[must_use]
    pub fn merge_defaults(defaults: impl Into<String>, current: impl Into<String>) -> Self {
        Self {
            change: ConfigChange::MergeDefaults {
                defaults: defaults.into(),
                current: current.into(),
            },
        }
    }

    /// Returns the change this step applies.
    #[must_use]
    pub const fn change(&self) -> &ConfigChange {
        &self.change
    }
}

#[async_trait]
impl TaskStep for ConfigStep {
    async fn apply(&self, ctx: &StepContext) -> StepResult<()> {
        let config = ctx.config();
        match &self.change {
            ConfigChange::Set {
                source, key, value, ..
            } => {
                config.write(source, key, value).await?;
                debug!(task = %ctx.task(), %source, %key, "set configuration value");
            }
            ConfigChange::AddIfAbsent { source, key, value } => {
                let added = config.add_if_absent(source, key, value).await?;
                debug!(task = %ctx.task(), %source, %key, added, "added configuration value");
            }
            ConfigChange::MergeDefaults { defaults, current } => {
                let added = config.merge_defaults(defaults, current).await?;
                info!(
                    task = %ctx.task(),
                    %defaults,
                    %current,
                    added = added.len(),
                    "merged configuration defaults"
                );
            }
        }
        Ok(())
    }

    async fn undo(&self, ctx: &StepContext) -> StepResult<()> {
        if let ConfigChange::Set {
            source,
            key,
            previous: Some(previous),
            ..
        } = &self.change
        {
            ctx.config().write(source, key, previous).await?;
            debug!(task = %ctx.task(), %source, %key, "restored configuration value");
        }
        Ok(())
    }

    fn reversibility(&self) -> Reversibility {
        match &self.change {
            ConfigChange::Set {
                previous: Some(_), ..
            } => Reversibility::Reversible,
            ConfigChange::Set { previous: None, .. }
            | ConfigChange::AddIfAbsent { .. }
            | ConfigChange::MergeDefaults { .. } => Reversibility::Irreversible,
        }
    }
}
