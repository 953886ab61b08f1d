//! Per-version task runner with compensating rollback.

use crate::migration::{
    domain::{
        MigrationDomainError, Reversibility, RollbackReport, RollbackResult, TaskDisposition,
        TaskExecutionError, TaskName, TaskPhase,
    },
    steps::{Collaborators, MigrationTask, StepContext, TaskStep},
};
use crate::version::domain::VersionId;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Ordered task steps of one version transition plus the stack of steps
/// applied so far.
///
/// A module is built fresh for every attempt. The completed stack starts
/// empty, grows with each successful [`VersionModule::run`] and is drained
/// by [`VersionModule::rollback`].
#[derive(Debug)]
pub struct VersionModule {
    version: VersionId,
    order: Vec<TaskName>,
    steps: HashMap<TaskName, MigrationTask>,
    completed: Vec<TaskName>,
}

impl VersionModule {
    /// Starts building a module for `version`.
    #[must_use]
    pub const fn builder(version: VersionId) -> VersionModuleBuilder {
        VersionModuleBuilder {
            version,
            tasks: Vec::new(),
        }
    }

    /// Returns the version this module migrates to.
    #[must_use]
    pub const fn version(&self) -> &VersionId {
        &self.version
    }

    /// Returns task names in execution order.
    #[must_use]
    pub fn tasks(&self) -> &[TaskName] {
        &self.order
    }

    /// Returns the names of applied tasks, oldest first.
    #[must_use]
    pub fn completed(&self) -> &[TaskName] {
        &self.completed
    }

    /// Applies the task called `name`.
    ///
    /// Unknown names are ignored without error, and a task that already
    /// applied in this module is not applied twice. A failed apply leaves
    /// the completed stack unchanged; rolling back is the caller's call.
    ///
    /// # Errors
    ///
    /// Returns [`TaskExecutionError`] wrapping the step's failure.
    #[instrument(level = "debug", skip(self, collaborators), fields(version = %self.version))]
    pub async fn run(
        &mut self,
        name: &str,
        collaborators: &Collaborators,
    ) -> Result<TaskDisposition, TaskExecutionError> {
        let Some((task, step)) = self.steps.get_key_value(name) else {
            debug!("ignoring unknown task");
            return Ok(TaskDisposition::Ignored);
        };
        if self.completed.contains(task) {
            debug!("task already applied in this module");
            return Ok(TaskDisposition::AlreadyApplied);
        }

        let ctx = StepContext::new(self.version.clone(), task.clone(), collaborators.clone());
        step.apply(&ctx)
            .await
            .map_err(|source| TaskExecutionError {
                version: self.version.clone(),
                task: task.clone(),
                phase: TaskPhase::Apply,
                source,
            })?;

        info!(kind = step.kind(), "task applied");
        self.completed.push(ctx.task().clone());
        Ok(TaskDisposition::Applied)
    }

    /// Undoes every applied task, newest first.
    ///
    /// Every undo is attempted even when an earlier one fails. Irreversible
    /// steps still have their undo called and are reported as irreversible
    /// when it succeeds. The completed stack is empty afterwards.
    #[instrument(level = "debug", skip(self, collaborators), fields(version = %self.version))]
    pub async fn rollback(&mut self, collaborators: &Collaborators) -> RollbackReport {
        let mut report = RollbackReport::default();
        while let Some(task) = self.completed.pop() {
            let Some(step) = self.steps.get(&task) else {
                continue;
            };

            let ctx = StepContext::new(self.version.clone(), task.clone(), collaborators.clone());
            match step.undo(&ctx).await {
                Ok(()) if step.reversibility() == Reversibility::Irreversible => {
                    debug!(%task, "irreversible task left in place");
                    report.push(task, RollbackResult::Irreversible);
                }
                Ok(()) => {
                    debug!(%task, "task undone");
                    report.push(task, RollbackResult::Undone);
                }
                Err(error) => {
                    warn!(%task, %error, "undo failed, continuing rollback");
                    report.push(task, RollbackResult::Failed(error));
                }
            }
        }
        report
    }
}

/// Builder collecting a module's tasks in execution order.
#[derive(Debug)]
pub struct VersionModuleBuilder {
    version: VersionId,
    tasks: Vec<(String, MigrationTask)>,
}

impl VersionModuleBuilder {
    /// Appends a task.
    #[must_use]
    pub fn task(mut self, name: impl Into<String>, step: impl Into<MigrationTask>) -> Self {
        self.tasks.push((name.into(), step.into()));
        self
    }

    /// Returns the version the module is being built for.
    #[must_use]
    pub const fn version(&self) -> &VersionId {
        &self.version
    }

    /// Validates task names and builds the module.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::InvalidTaskName`] for blank names and
    /// [`MigrationDomainError::DuplicateTask`] when a name repeats.
    pub fn build(self) -> Result<VersionModule, MigrationDomainError> {
        let mut order = Vec::with_capacity(self.tasks.len());
        let mut steps = HashMap::with_capacity(self.tasks.len());
        for (raw, step) in self.tasks {
            let name = TaskName::new(raw)?;
            if steps.contains_key(&name) {
                return Err(MigrationDomainError::DuplicateTask {
                    version: self.version,
                    task: name,
                });
            }
            order.push(name.clone());
            steps.insert(name, step);
        }
        Ok(VersionModule {
            version: self.version,
            order,
            steps,
            completed: Vec::new(),
        })
    }
}
