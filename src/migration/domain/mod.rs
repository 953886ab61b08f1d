//! Domain types for migration runs.

mod error;
mod ids;
mod journal;
mod report;
mod state;

pub use error::{
    MigrationDomainError, ParseVersionStateError, StepError, StepResult, TaskExecutionError,
};
pub use ids::{RunId, TaskName};
pub use journal::{JournalEntry, JournalEvent};
pub use report::{
    RollbackEntry, RollbackReport, RollbackResult, RunFailure, TaskReport, UndoFailure,
    UpgradeReport, VersionReport,
};
pub(crate) use report::RunHeader;
pub use state::{Reversibility, RunStatus, TaskDisposition, TaskOutcome, TaskPhase, VersionState};
