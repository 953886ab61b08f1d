//! Collaborators handed to task steps.

use crate::config::ports::ConfigStore;
use crate::migration::domain::TaskName;
use crate::store::ports::DataStore;
use crate::version::domain::VersionId;
use std::fmt;
use std::sync::Arc;

/// External systems a step may touch.
#[derive(Clone)]
pub struct Collaborators {
    store: Arc<dyn DataStore>,
    config: Arc<dyn ConfigStore>,
}

impl Collaborators {
    /// Bundles the store and configuration collaborators.
    #[must_use]
    pub const fn new(store: Arc<dyn DataStore>, config: Arc<dyn ConfigStore>) -> Self {
        Self { store, config }
    }

    /// Returns the store collaborator.
    #[must_use]
    pub fn store(&self) -> &dyn DataStore {
        self.store.as_ref()
    }

    /// Returns the configuration collaborator.
    #[must_use]
    pub fn config(&self) -> &dyn ConfigStore {
        self.config.as_ref()
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Invocation context of one step.
#[derive(Debug, Clone)]
pub struct StepContext {
    version: VersionId,
    task: TaskName,
    collaborators: Collaborators,
}

impl StepContext {
    /// Creates a context for `task` of `version`.
    #[must_use]
    pub const fn new(version: VersionId, task: TaskName, collaborators: Collaborators) -> Self {
        Self {
            version,
            task,
            collaborators,
        }
    }

    /// Returns the version whose module owns the step.
    #[must_use]
    pub const fn version(&self) -> &VersionId {
        &self.version
    }

    /// Returns the task name.
    #[must_use]
    pub const fn task(&self) -> &TaskName {
        &self.task
    }

    /// Returns the store collaborator.
    #[must_use]
    pub fn store(&self) -> &dyn DataStore {
        self.collaborators.store()
    }

    /// Returns the configuration collaborator.
    #[must_use]
    pub fn config(&self) -> &dyn ConfigStore {
        self.collaborators.config()
    }
}
