//! Lifecycle states and outcomes reported by migration runs.

use super::ParseVersionStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress of one version within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionState {
    /// Not attempted yet.
    Pending,
    /// Tasks are being applied.
    Running,
    /// Every task applied.
    Completed,
    /// A task failed and every undo succeeded or was a documented no-op.
    RolledBack,
    /// A task failed and at least one undo failed as well.
    Fatal,
}

impl VersionState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::RolledBack => "rolled_back",
            Self::Fatal => "fatal",
        }
    }

    /// Returns `true` when the state can no longer change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::RolledBack | Self::Fatal)
    }

    /// Returns `true` when moving from `self` to `next` is permitted.
    ///
    /// Versions move from pending to running, and from running to exactly
    /// one terminal state.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Completed | Self::RolledBack | Self::Fatal)
        )
    }
}

impl TryFrom<&str> for VersionState {
    type Error = ParseVersionStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "rolled_back" => Ok(Self::RolledBack),
            "fatal" => Ok(Self::Fatal),
            _ => Err(ParseVersionStateError(value.to_owned())),
        }
    }
}

impl fmt::Display for VersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of one task within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Applied and left in place.
    Applied,
    /// Applied, then reversed during rollback.
    Undone,
    /// Apply failed; the task is left as its apply left it.
    Failed,
    /// Applied, and its undo is a documented no-op so rollback left it in place.
    Irreversible,
    /// Applied, and its undo failed during rollback.
    UndoFailed,
}

impl TaskOutcome {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Undone => "undone",
            Self::Failed => "failed",
            Self::Irreversible => "irreversible",
            Self::UndoFailed => "undo_failed",
        }
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall status of an upgrade run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every version on the path completed.
    Completed,
    /// A version failed; later versions were not attempted.
    Aborted,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        })
    }
}

/// Result of asking a version module to run a task by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskDisposition {
    /// The step applied and was pushed onto the completed stack.
    Applied,
    /// No task with that name exists in the module; nothing happened.
    Ignored,
    /// The task already applied in this module instance; it was not
    /// applied again.
    AlreadyApplied,
}

/// Whether a step's undo reverses its apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Reversibility {
    /// Undo restores the state before apply.
    #[default]
    Reversible,
    /// Undo is a documented no-op.
    Irreversible,
}

/// Direction of a step invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPhase {
    /// Forward change.
    Apply,
    /// Compensating change.
    Undo,
}

impl fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Apply => "apply",
            Self::Undo => "undo",
        })
    }
}
