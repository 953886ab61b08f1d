//! Shared world state for upgrade BDD scenarios.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rstest::fixture;
use stepladder::{
    config::adapters::InMemoryConfigStore,
    migration::{
        adapters::InMemoryJournal,
        domain::{StepError, StepResult, UpgradeReport},
        services::{MigrationRegistry, UpgradeError},
        steps::{Collaborators, MigrationTask, StepContext, TaskStep},
    },
    store::adapters::InMemoryDataStore,
    version::domain::VersionId,
};

/// Shared record of step invocations, e.g. `apply 1.1/a`.
#[derive(Debug, Clone, Default)]
pub struct StepLog(Arc<Mutex<Vec<String>>>);

impl StepLog {
    fn push(&self, entry: String) {
        if let Ok(mut entries) = self.0.lock() {
            entries.push(entry);
        }
    }

    /// Returns recorded invocations, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().map(|entries| entries.clone()).unwrap_or_default()
    }
}

/// Step that logs each invocation and fails its apply on request.
pub struct LoggedStep {
    log: StepLog,
    fails: bool,
}

#[async_trait]
impl TaskStep for LoggedStep {
    async fn apply(&self, ctx: &StepContext) -> StepResult<()> {
        self.log.push(format!("apply {}/{}", ctx.version(), ctx.task()));
        if self.fails {
            return Err(StepError::failed(format!("{} refused to apply", ctx.task())));
        }
        Ok(())
    }

    async fn undo(&self, ctx: &StepContext) -> StepResult<()> {
        self.log.push(format!("undo {}/{}", ctx.version(), ctx.task()));
        Ok(())
    }
}

/// Scenario world for upgrade behaviour tests.
#[derive(Default)]
pub struct UpgradeWorld {
    pub edges: Vec<(String, String)>,
    pub modules: BTreeMap<String, Vec<String>>,
    pub failing: BTreeSet<(String, String)>,
    pub log: StepLog,
    pub result: Option<Result<UpgradeReport, UpgradeError>>,
}

impl UpgradeWorld {
    /// Builds a registry from the declared modules.
    pub fn registry(&self) -> Result<MigrationRegistry, eyre::Report> {
        let mut registry = MigrationRegistry::new();
        for (version, tasks) in &self.modules {
            let id = VersionId::new(version.as_str())?;
            let planned: Vec<(String, bool)> = tasks
                .iter()
                .map(|task| {
                    let fails = self.failing.contains(&(version.clone(), task.clone()));
                    (task.clone(), fails)
                })
                .collect();
            let log = self.log.clone();
            registry.register(id, move |builder| {
                planned.iter().fold(builder, |next, (task, fails)| {
                    next.task(
                        task.as_str(),
                        MigrationTask::custom(LoggedStep {
                            log: log.clone(),
                            fails: *fails,
                        }),
                    )
                })
            })?;
        }
        Ok(registry)
    }

    /// Returns collaborators backed by empty in-memory adapters.
    pub fn collaborators() -> Collaborators {
        Collaborators::new(
            Arc::new(InMemoryDataStore::new()),
            Arc::new(InMemoryConfigStore::new()),
        )
    }

    /// Returns a fresh journal.
    pub fn journal() -> InMemoryJournal {
        InMemoryJournal::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> UpgradeWorld {
    UpgradeWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
