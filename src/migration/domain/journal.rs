//! Append-only journal records of upgrade runs.

use super::{RunId, RunStatus, TaskName, VersionState};
use crate::version::domain::{Target, VersionId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Something that happened during an upgrade run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JournalEvent {
    /// The path was resolved and every module passed preflight.
    RunStarted {
        /// Starting version.
        from: VersionId,
        /// Requested target.
        target: Target,
        /// Versions that will be attempted, in order.
        path: Vec<VersionId>,
        /// Fingerprint of the graph the path was resolved against.
        graph_fingerprint: String,
    },
    /// A version started running.
    VersionStarted {
        /// Version being migrated.
        version: VersionId,
    },
    /// A task applied successfully.
    TaskApplied {
        /// Owning version.
        version: VersionId,
        /// Task name.
        task: TaskName,
    },
    /// A task's apply failed.
    TaskFailed {
        /// Owning version.
        version: VersionId,
        /// Task name.
        task: TaskName,
        /// Error message.
        message: String,
    },
    /// A task was reversed during rollback.
    TaskUndone {
        /// Owning version.
        version: VersionId,
        /// Task name.
        task: TaskName,
    },
    /// Rollback ran the no-op undo of an irreversible task.
    TaskIrreversible {
        /// Owning version.
        version: VersionId,
        /// Task name.
        task: TaskName,
    },
    /// A task's undo failed during rollback.
    UndoFailed {
        /// Owning version.
        version: VersionId,
        /// Task name.
        task: TaskName,
        /// Error message.
        message: String,
    },
    /// A version reached a terminal state.
    VersionFinished {
        /// Version that finished.
        version: VersionId,
        /// Terminal state.
        state: VersionState,
    },
    /// The run finished.
    RunFinished {
        /// Final run status.
        status: RunStatus,
    },
}

/// Journal entry with run correlation and ordering metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    run_id: RunId,
    sequence: u64,
    recorded_at: DateTime<Utc>,
    event: JournalEvent,
}

impl JournalEntry {
    /// Creates an entry timestamped by `clock`.
    #[must_use]
    pub fn new(run_id: RunId, sequence: u64, event: JournalEvent, clock: &impl Clock) -> Self {
        Self {
            run_id,
            sequence,
            recorded_at: clock.utc(),
            event,
        }
    }

    /// Returns the run this entry belongs to.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Returns the position of the entry within its run, starting at zero.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns when the entry was recorded.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Returns the recorded event.
    #[must_use]
    pub const fn event(&self) -> &JournalEvent {
        &self.event
    }
}
