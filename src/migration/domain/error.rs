//! Error types for migration steps, modules and domain validation.

use super::{TaskName, TaskPhase, VersionState};
use crate::config::ports::ConfigError;
use crate::store::ports::StoreError;
use crate::version::domain::VersionId;
use thiserror::Error;

/// Result type returned by task steps.
pub type StepResult<T> = Result<T, StepError>;

/// Failure raised by a task step's apply or undo.
#[derive(Debug, Clone, Error)]
pub enum StepError {
    /// Something the step depends on is absent, usually because an
    /// earlier migration has not run. Never retried.
    #[error("missing prerequisite: {0}")]
    MissingPrerequisite(String),

    /// The store rejected an operation.
    #[error(transparent)]
    Store(StoreError),

    /// The configuration collaborator rejected an operation.
    #[error(transparent)]
    Config(ConfigError),

    /// A statement template could not be rendered.
    #[error("template error: {0}")]
    Template(String),

    /// Step-specific failure.
    #[error("{0}")]
    Failed(String),
}

impl StepError {
    /// Creates a step-specific failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Returns `true` for failures caused by an absent prerequisite.
    #[must_use]
    pub const fn is_missing_prerequisite(&self) -> bool {
        matches!(self, Self::MissingPrerequisite(_))
    }
}

impl From<StoreError> for StepError {
    fn from(err: StoreError) -> Self {
        if err.is_missing_prerequisite() {
            Self::MissingPrerequisite(err.to_string())
        } else {
            Self::Store(err)
        }
    }
}

impl From<ConfigError> for StepError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingSource(_) => Self::MissingPrerequisite(err.to_string()),
            other => Self::Config(other),
        }
    }
}

/// Step failure annotated with where it happened.
#[derive(Debug, Clone, Error)]
#[error("{phase} of task {task} in version {version} failed: {source}")]
pub struct TaskExecutionError {
    /// Version whose module ran the step.
    pub version: VersionId,
    /// Task name within the module.
    pub task: TaskName,
    /// Direction of the failed invocation.
    pub phase: TaskPhase,
    /// Underlying step failure.
    pub source: StepError,
}

/// Errors returned while constructing migration domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MigrationDomainError {
    /// The task name is empty after trimming.
    #[error("invalid task name '{0}'")]
    InvalidTaskName(String),

    /// A version module declares the same task twice.
    #[error("task {task} declared twice in version {version}")]
    DuplicateTask {
        /// Version whose module is being built.
        version: VersionId,
        /// Repeated task name.
        task: TaskName,
    },

    /// A second module factory was registered for a version.
    #[error("a migration module is already registered for version {0}")]
    DuplicateModule(VersionId),

    /// No module factory is registered for the version.
    #[error("no migration module registered for version {0}")]
    UnregisteredVersion(VersionId),

    /// A version state change is not permitted.
    #[error("version {version} cannot move from {from} to {to}")]
    InvalidStateTransition {
        /// Version whose state was changing.
        version: VersionId,
        /// Current state.
        from: VersionState,
        /// Requested state.
        to: VersionState,
    },
}

/// Error returned while parsing version states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown version state: {0}")]
pub struct ParseVersionStateError(pub String);
