//! Then steps for upgrade BDD scenarios.

use super::world::UpgradeWorld;
use rstest_bdd_macros::then;
use stepladder::{
    migration::{
        domain::{TaskOutcome, UpgradeReport, VersionState},
        services::UpgradeError,
    },
    version::domain::VersionId,
};

fn report(world: &UpgradeWorld) -> Result<&UpgradeReport, eyre::Report> {
    match world.result.as_ref() {
        Some(Ok(report)) => Ok(report),
        Some(Err(err)) => Err(eyre::eyre!("upgrade failed unexpectedly: {err}")),
        None => Err(eyre::eyre!("no upgrade has run in this scenario")),
    }
}

#[then(r#"the run status is "{status}""#)]
fn run_status_is(world: &UpgradeWorld, status: String) -> Result<(), eyre::Report> {
    let actual = report(world)?.status().to_string();
    if actual != status {
        return Err(eyre::eyre!("expected run status {status}, found {actual}"));
    }
    Ok(())
}

#[then(r#"version "{version}" is "{state}""#)]
fn version_is(world: &UpgradeWorld, version: String, state: String) -> Result<(), eyre::Report> {
    let expected = VersionState::try_from(state.as_str())
        .map_err(|err| eyre::eyre!("invalid expected state in scenario: {err}"))?;
    let id = VersionId::new(version.as_str())?;
    let actual = report(world)?
        .version(&id)
        .map(|entry| entry.state())
        .ok_or_else(|| eyre::eyre!("version {version} is not on the path"))?;
    if actual != expected {
        return Err(eyre::eyre!("expected {version} to be {expected}, found {actual}"));
    }
    Ok(())
}

#[then(r#"task "{task}" of version "{version}" is "{outcome}""#)]
fn task_outcome_is(
    world: &UpgradeWorld,
    task: String,
    version: String,
    outcome: String,
) -> Result<(), eyre::Report> {
    let id = VersionId::new(version.as_str())?;
    let actual: Option<TaskOutcome> = report(world)?
        .version(&id)
        .and_then(|entry| entry.outcome_of(&task));
    let actual_label = actual.map(TaskOutcome::as_str);
    if actual_label != Some(outcome.as_str()) {
        return Err(eyre::eyre!(
            "expected task {task} of {version} to be {outcome}, found {actual_label:?}"
        ));
    }
    Ok(())
}

#[then(r#"the step log is "{entries}""#)]
fn step_log_is(world: &UpgradeWorld, entries: String) -> Result<(), eyre::Report> {
    let expected: Vec<String> = entries
        .split(',')
        .map(str::trim)
        .map(str::to_owned)
        .collect();
    let actual = world.log.entries();
    if actual != expected {
        return Err(eyre::eyre!("expected step log {expected:?}, found {actual:?}"));
    }
    Ok(())
}

#[then("no steps ran")]
fn no_steps_ran(world: &UpgradeWorld) -> Result<(), eyre::Report> {
    let actual = world.log.entries();
    if !actual.is_empty() {
        return Err(eyre::eyre!("expected no step invocations, found {actual:?}"));
    }
    Ok(())
}

#[then(r#"the upgrade is rejected because version "{version}" has no module"#)]
fn upgrade_rejected_for_missing_module(
    world: &UpgradeWorld,
    version: String,
) -> Result<(), eyre::Report> {
    let expected = VersionId::new(version.as_str())?;
    match world.result.as_ref() {
        Some(Err(UpgradeError::MissingVersionModule(missing))) if *missing == expected => Ok(()),
        other => Err(eyre::eyre!(
            "expected missing module error for {version}, got {other:?}"
        )),
    }
}
