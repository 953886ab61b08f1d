//! Unit tests for version state transitions and name validation.

use super::support::version;
use crate::migration::domain::{
    MigrationDomainError, ParseVersionStateError, TaskName, VersionReport, VersionState,
};
use eyre::ensure;
use rstest::rstest;

#[rstest]
#[case(VersionState::Pending, VersionState::Pending, false)]
#[case(VersionState::Pending, VersionState::Running, true)]
#[case(VersionState::Pending, VersionState::Completed, false)]
#[case(VersionState::Pending, VersionState::RolledBack, false)]
#[case(VersionState::Pending, VersionState::Fatal, false)]
#[case(VersionState::Running, VersionState::Pending, false)]
#[case(VersionState::Running, VersionState::Running, false)]
#[case(VersionState::Running, VersionState::Completed, true)]
#[case(VersionState::Running, VersionState::RolledBack, true)]
#[case(VersionState::Running, VersionState::Fatal, true)]
#[case(VersionState::Completed, VersionState::Running, false)]
#[case(VersionState::Completed, VersionState::RolledBack, false)]
#[case(VersionState::RolledBack, VersionState::Running, false)]
#[case(VersionState::RolledBack, VersionState::Completed, false)]
#[case(VersionState::Fatal, VersionState::Running, false)]
#[case(VersionState::Fatal, VersionState::RolledBack, false)]
fn version_state_transitions(
    #[case] from: VersionState,
    #[case] to: VersionState,
    #[case] allowed: bool,
) {
    assert_eq!(from.can_transition_to(to), allowed);
}

#[rstest]
#[case(VersionState::Pending)]
#[case(VersionState::Running)]
#[case(VersionState::Completed)]
#[case(VersionState::RolledBack)]
#[case(VersionState::Fatal)]
fn version_state_parses_its_storage_form(#[case] state: VersionState) {
    assert_eq!(VersionState::try_from(state.as_str()), Ok(state));
}

#[test]
fn version_state_rejects_unknown_values() {
    assert_eq!(
        VersionState::try_from("halfway"),
        Err(ParseVersionStateError("halfway".to_owned()))
    );
}

#[test]
fn version_report_rejects_skipping_running() -> eyre::Result<()> {
    let mut report = VersionReport::pending(version("1.1"));

    let result = report.advance(VersionState::Completed);

    ensure!(matches!(
        result,
        Err(MigrationDomainError::InvalidStateTransition {
            from: VersionState::Pending,
            to: VersionState::Completed,
            ..
        })
    ));
    ensure!(report.state() == VersionState::Pending);
    Ok(())
}

#[test]
fn version_report_follows_happy_path() -> eyre::Result<()> {
    let mut report = VersionReport::pending(version("1.1"));

    report.advance(VersionState::Running)?;
    report.advance(VersionState::Completed)?;

    ensure!(report.state() == VersionState::Completed);
    ensure!(report.state().is_terminal());
    Ok(())
}

#[rstest]
#[case("  add-column  ", "add-column")]
#[case("backfill", "backfill")]
fn task_names_are_trimmed(#[case] raw: &str, #[case] expected: &str) -> eyre::Result<()> {
    let name = TaskName::new(raw)?;
    ensure!(name.as_str() == expected);
    Ok(())
}

#[test]
fn blank_task_names_are_rejected() {
    assert_eq!(
        TaskName::new("   "),
        Err(MigrationDomainError::InvalidTaskName("   ".to_owned()))
    );
}
