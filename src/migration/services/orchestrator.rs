//! Orchestrator driving an installation from its current version to a
//! target.

use super::{MigrationRegistry, VersionModule};
use crate::migration::{
    domain::{
        JournalEntry, JournalEvent, MigrationDomainError, RollbackReport, RollbackResult,
        RunFailure, RunHeader, RunId, TaskDisposition, TaskExecutionError, TaskName, TaskOutcome,
        UpgradeReport, VersionReport, VersionState,
    },
    ports::MigrationJournal,
    steps::Collaborators,
};
use crate::version::domain::{MigrationPath, Target, VersionGraph, VersionGraphError, VersionId};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Errors that prevent an upgrade run from starting or continuing.
///
/// Step failures are not errors at this level: they abort the run and are
/// reported in [`UpgradeReport::failure`].
#[derive(Debug, Clone, Error)]
pub enum UpgradeError {
    /// The path could not be resolved.
    #[error(transparent)]
    Path(#[from] VersionGraphError),

    /// A version on the path has no registered module.
    #[error("no migration module registered for version {0}")]
    MissingVersionModule(VersionId),

    /// A module could not be constructed.
    #[error("failed to build migration module for version {version}: {source}")]
    Registry {
        /// Version whose module failed to build.
        version: VersionId,
        /// Construction error.
        source: MigrationDomainError,
    },

    /// A version state change was rejected.
    #[error(transparent)]
    State(MigrationDomainError),
}

/// Runs version modules along a resolved migration path.
#[derive(Clone)]
pub struct MigrationOrchestrator<J, C>
where
    J: MigrationJournal,
    C: Clock + Send + Sync,
{
    graph: Arc<VersionGraph>,
    registry: Arc<MigrationRegistry>,
    collaborators: Collaborators,
    journal: Arc<J>,
    clock: Arc<C>,
}

impl<J, C> MigrationOrchestrator<J, C>
where
    J: MigrationJournal,
    C: Clock + Send + Sync,
{
    /// Creates a new orchestrator.
    #[must_use]
    pub const fn new(
        graph: Arc<VersionGraph>,
        registry: Arc<MigrationRegistry>,
        collaborators: Collaborators,
        journal: Arc<J>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            graph,
            registry,
            collaborators,
            journal,
            clock,
        }
    }

    /// Resolves the path from `current` to `target` and checks that every
    /// version on it has a registered module.
    ///
    /// # Errors
    ///
    /// Returns [`UpgradeError::Path`] when the path cannot be resolved and
    /// [`UpgradeError::MissingVersionModule`] for the first version without
    /// a module.
    pub fn plan(
        &self,
        current: &VersionId,
        target: &Target,
    ) -> Result<MigrationPath, UpgradeError> {
        let path = self.graph.resolve_path(current, target)?;
        if let Some(missing) = path.iter().find(|version| !self.registry.contains(version)) {
            return Err(UpgradeError::MissingVersionModule(missing.clone()));
        }
        Ok(path)
    }

    /// Migrates an installation from `current` towards `target`.
    ///
    /// Versions run one at a time in path order. When a task fails, the
    /// version's applied tasks are undone newest first, the version is
    /// marked rolled back (or fatal when an undo also failed) and no later
    /// version is attempted. An empty path completes without running
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns [`UpgradeError`] when the path cannot be resolved or a
    /// module is missing or invalid. These checks finish before any task
    /// runs.
    #[instrument(
        level = "info",
        skip(self, current, target),
        fields(current = %current, target = %target)
    )]
    pub async fn upgrade(
        &self,
        current: &VersionId,
        target: &Target,
    ) -> Result<UpgradeReport, UpgradeError> {
        let path = self.plan(current, target)?;
        let mut modules = self.build_modules(&path)?;

        let header = RunHeader {
            run_id: RunId::new(),
            from: current.clone(),
            target: target.clone(),
            path,
            graph_fingerprint: self.graph.fingerprint(),
        };
        let mut recorder = Recorder::new(header.run_id, self.journal.as_ref(), self.clock.as_ref());
        info!(run_id = %header.run_id, versions = header.path.len(), "starting upgrade run");
        recorder
            .record(JournalEvent::RunStarted {
                from: header.from.clone(),
                target: header.target.clone(),
                path: header.path.versions().to_vec(),
                graph_fingerprint: header.graph_fingerprint.to_string(),
            })
            .await;

        let mut versions: Vec<VersionReport> = header
            .path
            .iter()
            .cloned()
            .map(VersionReport::pending)
            .collect();
        let mut failure = None;
        for (module, report) in modules.iter_mut().zip(versions.iter_mut()) {
            if let Some(run_failure) = self.run_version(module, report, &mut recorder).await? {
                failure = Some(run_failure);
                break;
            }
        }

        let upgrade = UpgradeReport::new(header, versions, failure);
        info!(status = %upgrade.status(), reached = %upgrade.reached(), "upgrade run finished");
        recorder
            .record(JournalEvent::RunFinished {
                status: upgrade.status(),
            })
            .await;
        Ok(upgrade)
    }

    fn build_modules(&self, path: &MigrationPath) -> Result<Vec<VersionModule>, UpgradeError> {
        path.iter()
            .map(|version| {
                self.registry
                    .build(version)
                    .map_err(|source| UpgradeError::Registry {
                        version: version.clone(),
                        source,
                    })
            })
            .collect()
    }

    async fn run_version(
        &self,
        module: &mut VersionModule,
        report: &mut VersionReport,
        recorder: &mut Recorder<'_, J, C>,
    ) -> Result<Option<RunFailure>, UpgradeError> {
        let version = module.version().clone();
        report
            .advance(VersionState::Running)
            .map_err(UpgradeError::State)?;
        info!(%version, tasks = module.tasks().len(), "migrating version");
        recorder
            .record(JournalEvent::VersionStarted {
                version: version.clone(),
            })
            .await;

        let tasks: Vec<TaskName> = module.tasks().to_vec();
        for task in tasks {
            match module.run(task.as_str(), &self.collaborators).await {
                Ok(TaskDisposition::Applied) => {
                    report.record_task(task.clone(), TaskOutcome::Applied);
                    recorder
                        .record(JournalEvent::TaskApplied {
                            version: version.clone(),
                            task,
                        })
                        .await;
                }
                Ok(TaskDisposition::Ignored | TaskDisposition::AlreadyApplied) => {}
                Err(failure) => {
                    let run_failure = self.unwind(module, report, recorder, failure).await?;
                    return Ok(Some(run_failure));
                }
            }
        }

        report
            .advance(VersionState::Completed)
            .map_err(UpgradeError::State)?;
        recorder
            .record(JournalEvent::VersionFinished {
                version,
                state: VersionState::Completed,
            })
            .await;
        Ok(None)
    }

    async fn unwind(
        &self,
        module: &mut VersionModule,
        report: &mut VersionReport,
        recorder: &mut Recorder<'_, J, C>,
        failure: TaskExecutionError,
    ) -> Result<RunFailure, UpgradeError> {
        let version = failure.version.clone();
        warn!(
            %version,
            task = %failure.task,
            error = %failure.source,
            "task failed, rolling back version"
        );
        report.record_task(failure.task.clone(), TaskOutcome::Failed);
        recorder
            .record(JournalEvent::TaskFailed {
                version: version.clone(),
                task: failure.task.clone(),
                message: failure.source.to_string(),
            })
            .await;

        let rollback = module.rollback(&self.collaborators).await;
        record_rollback(&version, &rollback, report, recorder).await;

        let state = if rollback.is_clean() {
            VersionState::RolledBack
        } else {
            VersionState::Fatal
        };
        report.advance(state).map_err(UpgradeError::State)?;
        recorder
            .record(JournalEvent::VersionFinished { version, state })
            .await;
        Ok(RunFailure::new(failure, &rollback))
    }
}

async fn record_rollback<J, C>(
    version: &VersionId,
    rollback: &RollbackReport,
    report: &mut VersionReport,
    recorder: &mut Recorder<'_, J, C>,
) where
    J: MigrationJournal,
    C: Clock + Send + Sync,
{
    for entry in rollback.entries() {
        report.record_task(entry.task.clone(), entry.outcome());
        let event = match &entry.result {
            RollbackResult::Undone => JournalEvent::TaskUndone {
                version: version.clone(),
                task: entry.task.clone(),
            },
            RollbackResult::Irreversible => JournalEvent::TaskIrreversible {
                version: version.clone(),
                task: entry.task.clone(),
            },
            RollbackResult::Failed(error) => JournalEvent::UndoFailed {
                version: version.clone(),
                task: entry.task.clone(),
                message: error.to_string(),
            },
        };
        recorder.record(event).await;
    }
}

/// Appends sequenced entries for one run. Journal failures are logged and
/// otherwise ignored.
struct Recorder<'a, J, C> {
    run_id: RunId,
    next_sequence: u64,
    journal: &'a J,
    clock: &'a C,
}

impl<'a, J, C> Recorder<'a, J, C>
where
    J: MigrationJournal,
    C: Clock + Send + Sync,
{
    const fn new(run_id: RunId, journal: &'a J, clock: &'a C) -> Self {
        Self {
            run_id,
            next_sequence: 0,
            journal,
            clock,
        }
    }

    async fn record(&mut self, event: JournalEvent) {
        let entry = JournalEntry::new(self.run_id, self.next_sequence, event, self.clock);
        self.next_sequence += 1;
        if let Err(error) = self.journal.record(&entry).await {
            warn!(
                run_id = %self.run_id,
                sequence = entry.sequence(),
                %error,
                "failed to record journal entry"
            );
        }
    }
}
