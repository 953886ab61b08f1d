//! Reports produced by version modules and upgrade runs.

use super::{
    MigrationDomainError, RunId, RunStatus, StepError, TaskExecutionError, TaskName, TaskOutcome,
    VersionState,
};
use crate::version::domain::{GraphFingerprint, MigrationPath, Target, VersionId};

/// Outcome of one task in a version report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    /// Task name.
    pub task: TaskName,
    /// Final outcome.
    pub outcome: TaskOutcome,
}

/// How a single completed task was treated during rollback.
#[derive(Debug, Clone)]
pub enum RollbackResult {
    /// Undo succeeded.
    Undone,
    /// Undo is a documented no-op and left the change in place.
    Irreversible,
    /// Undo failed.
    Failed(StepError),
}

/// One task visited during rollback.
#[derive(Debug, Clone)]
pub struct RollbackEntry {
    /// Task name.
    pub task: TaskName,
    /// What happened to it.
    pub result: RollbackResult,
}

impl RollbackEntry {
    /// Returns the task outcome this entry implies.
    #[must_use]
    pub const fn outcome(&self) -> TaskOutcome {
        match self.result {
            RollbackResult::Undone => TaskOutcome::Undone,
            RollbackResult::Irreversible => TaskOutcome::Irreversible,
            RollbackResult::Failed(_) => TaskOutcome::UndoFailed,
        }
    }
}

/// An undo that failed during rollback.
#[derive(Debug, Clone)]
pub struct UndoFailure {
    /// Task whose undo failed.
    pub task: TaskName,
    /// Undo error.
    pub error: StepError,
}

/// Record of one rollback, in the order tasks were unwound (newest first).
#[derive(Debug, Clone, Default)]
pub struct RollbackReport {
    entries: Vec<RollbackEntry>,
}

impl RollbackReport {
    pub(crate) fn push(&mut self, task: TaskName, result: RollbackResult) {
        self.entries.push(RollbackEntry { task, result });
    }

    /// Returns every visited task, newest first.
    #[must_use]
    pub fn entries(&self) -> &[RollbackEntry] {
        &self.entries
    }

    /// Returns the names of tasks whose undo succeeded, in unwind order.
    #[must_use]
    pub fn undone(&self) -> Vec<&TaskName> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.result, RollbackResult::Undone))
            .map(|entry| &entry.task)
            .collect()
    }

    /// Returns the failed undos in unwind order.
    #[must_use]
    pub fn failures(&self) -> Vec<UndoFailure> {
        self.entries
            .iter()
            .filter_map(|entry| match &entry.result {
                RollbackResult::Failed(error) => Some(UndoFailure {
                    task: entry.task.clone(),
                    error: error.clone(),
                }),
                RollbackResult::Undone | RollbackResult::Irreversible => None,
            })
            .collect()
    }

    /// Returns `true` when no undo failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| !matches!(entry.result, RollbackResult::Failed(_)))
    }

    /// Returns `true` when there was nothing to unwind.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-version section of an upgrade report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReport {
    version: VersionId,
    state: VersionState,
    tasks: Vec<TaskReport>,
}

impl VersionReport {
    /// Creates a report for a version that has not been attempted.
    #[must_use]
    pub const fn pending(version: VersionId) -> Self {
        Self {
            version,
            state: VersionState::Pending,
            tasks: Vec::new(),
        }
    }

    /// Returns the version.
    #[must_use]
    pub const fn version(&self) -> &VersionId {
        &self.version
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> VersionState {
        self.state
    }

    /// Returns the attempted tasks in execution order.
    #[must_use]
    pub fn tasks(&self) -> &[TaskReport] {
        &self.tasks
    }

    /// Returns the outcome recorded for a task, if it was attempted.
    #[must_use]
    pub fn outcome_of(&self, task: &str) -> Option<TaskOutcome> {
        self.tasks
            .iter()
            .find(|report| report.task.as_str() == task)
            .map(|report| report.outcome)
    }

    /// Moves the version to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::InvalidStateTransition`] when the
    /// state machine forbids the change.
    pub fn advance(&mut self, next: VersionState) -> Result<(), MigrationDomainError> {
        if !self.state.can_transition_to(next) {
            return Err(MigrationDomainError::InvalidStateTransition {
                version: self.version.clone(),
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    pub(crate) fn record_task(&mut self, task: TaskName, outcome: TaskOutcome) {
        if let Some(existing) = self.tasks.iter_mut().find(|report| report.task == task) {
            existing.outcome = outcome;
        } else {
            self.tasks.push(TaskReport { task, outcome });
        }
    }
}

/// Details of the failure that aborted a run.
#[derive(Debug, Clone)]
pub struct RunFailure {
    /// Version whose task failed.
    pub version: VersionId,
    /// Task whose apply failed.
    pub task: TaskName,
    /// Apply error.
    pub error: StepError,
    /// Undos that failed while unwinding the version.
    pub rollback_failures: Vec<UndoFailure>,
}

impl RunFailure {
    /// Combines the triggering error with the rollback that followed it.
    #[must_use]
    pub fn new(failure: TaskExecutionError, rollback: &RollbackReport) -> Self {
        Self {
            version: failure.version,
            task: failure.task,
            error: failure.source,
            rollback_failures: rollback.failures(),
        }
    }
}

/// Result of one upgrade run.
#[derive(Debug, Clone)]
pub struct UpgradeReport {
    run_id: RunId,
    from: VersionId,
    target: Target,
    path: MigrationPath,
    graph_fingerprint: GraphFingerprint,
    status: RunStatus,
    versions: Vec<VersionReport>,
    failure: Option<RunFailure>,
}

/// Parts of an [`UpgradeReport`] known before the run starts.
#[derive(Debug, Clone)]
pub(crate) struct RunHeader {
    pub(crate) run_id: RunId,
    pub(crate) from: VersionId,
    pub(crate) target: Target,
    pub(crate) path: MigrationPath,
    pub(crate) graph_fingerprint: GraphFingerprint,
}

impl UpgradeReport {
    pub(crate) fn new(
        header: RunHeader,
        versions: Vec<VersionReport>,
        failure: Option<RunFailure>,
    ) -> Self {
        let status = if failure.is_some() {
            RunStatus::Aborted
        } else {
            RunStatus::Completed
        };
        Self {
            run_id: header.run_id,
            from: header.from,
            target: header.target,
            path: header.path,
            graph_fingerprint: header.graph_fingerprint,
            status,
            versions,
            failure,
        }
    }

    /// Returns the run identifier used in the journal.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Returns the version the installation started from.
    #[must_use]
    pub const fn started_from(&self) -> &VersionId {
        &self.from
    }

    /// Returns the requested target.
    #[must_use]
    pub const fn target(&self) -> &Target {
        &self.target
    }

    /// Returns the resolved path.
    #[must_use]
    pub const fn path(&self) -> &MigrationPath {
        &self.path
    }

    /// Returns the fingerprint of the graph used to resolve the path.
    #[must_use]
    pub const fn graph_fingerprint(&self) -> &GraphFingerprint {
        &self.graph_fingerprint
    }

    /// Returns the run status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Returns `true` when every version on the path completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, RunStatus::Completed)
    }

    /// Returns one report per version on the path, in path order.
    #[must_use]
    pub fn versions(&self) -> &[VersionReport] {
        &self.versions
    }

    /// Returns the report of one version on the path.
    #[must_use]
    pub fn version(&self, version: &VersionId) -> Option<&VersionReport> {
        self.versions
            .iter()
            .find(|report| report.version() == version)
    }

    /// Returns the failure that aborted the run, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&RunFailure> {
        self.failure.as_ref()
    }

    /// Returns the newest version whose migrations completed, or the
    /// starting version when none did.
    #[must_use]
    pub fn reached(&self) -> &VersionId {
        self.versions
            .iter()
            .rev()
            .find(|report| report.state() == VersionState::Completed)
            .map_or(&self.from, VersionReport::version)
    }
}
