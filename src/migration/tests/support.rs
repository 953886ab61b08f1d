//! Shared fixtures for migration tests.

use crate::config::adapters::InMemoryConfigStore;
use crate::migration::{
    domain::{Reversibility, StepError, StepResult},
    steps::{Collaborators, MigrationTask, StepContext, TaskStep},
};
use crate::store::adapters::InMemoryDataStore;
use crate::version::domain::VersionId;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub(super) fn version(raw: &str) -> VersionId {
    VersionId::new(raw).expect("valid version identifier")
}

/// Ordered record of step invocations, e.g. `apply:A` or `undo:B`.
#[derive(Debug, Clone, Default)]
pub(super) struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: String) {
        self.0.lock().expect("call log lock").push(entry);
    }

    pub(super) fn calls(&self) -> Vec<String> {
        self.0.lock().expect("call log lock").clone()
    }
}

/// Step that records its invocations and fails on request.
#[derive(Debug, Clone)]
pub(super) struct ScriptedStep {
    label: String,
    log: CallLog,
    fail_apply: bool,
    fail_undo: bool,
    reversibility: Reversibility,
}

impl ScriptedStep {
    pub(super) fn new(label: &str, log: &CallLog) -> Self {
        Self {
            label: label.to_owned(),
            log: log.clone(),
            fail_apply: false,
            fail_undo: false,
            reversibility: Reversibility::Reversible,
        }
    }

    pub(super) fn failing_apply(mut self) -> Self {
        self.fail_apply = true;
        self
    }

    pub(super) fn failing_undo(mut self) -> Self {
        self.fail_undo = true;
        self
    }

    pub(super) fn irreversible(mut self) -> Self {
        self.reversibility = Reversibility::Irreversible;
        self
    }

    pub(super) fn task(self) -> MigrationTask {
        MigrationTask::custom(self)
    }
}

#[async_trait]
impl TaskStep for ScriptedStep {
    async fn apply(&self, ctx: &StepContext) -> StepResult<()> {
        self.log.push(format!("apply:{}", self.label));
        if self.fail_apply {
            return Err(StepError::failed(format!(
                "{} failed in {}",
                ctx.task(),
                ctx.version()
            )));
        }
        Ok(())
    }

    async fn undo(&self, _ctx: &StepContext) -> StepResult<()> {
        self.log.push(format!("undo:{}", self.label));
        if self.fail_undo {
            return Err(StepError::failed(format!("cannot undo {}", self.label)));
        }
        Ok(())
    }

    fn reversibility(&self) -> Reversibility {
        self.reversibility
    }
}

/// In-memory collaborators plus handles for inspecting them.
#[derive(Debug, Clone)]
pub(super) struct TestCollaborators {
    pub(super) store: InMemoryDataStore,
    pub(super) config: InMemoryConfigStore,
    pub(super) collaborators: Collaborators,
}

pub(super) fn in_memory_collaborators() -> TestCollaborators {
    let store = InMemoryDataStore::new();
    let config = InMemoryConfigStore::new();
    let collaborators = Collaborators::new(Arc::new(store.clone()), Arc::new(config.clone()));
    TestCollaborators {
        store,
        config,
        collaborators,
    }
}
