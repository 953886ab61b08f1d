//! Port contracts for migration runs.

pub mod journal;

pub use journal::{JournalError, JournalResult, MigrationJournal};

#[cfg(test)]
pub use journal::MockMigrationJournal;
