//! When steps for upgrade BDD scenarios.

use super::world::{UpgradeWorld, run_async};
use mockable::DefaultClock;
use rstest_bdd_macros::when;
use std::sync::Arc;
use stepladder::{
    migration::services::MigrationOrchestrator,
    version::domain::{Target, VersionGraph, VersionId},
};

fn upgrade(world: &mut UpgradeWorld, from: &str, target: Target) -> Result<(), eyre::Report> {
    let graph = world
        .edges
        .iter()
        .fold(VersionGraph::builder(), |builder, (from_version, to_version)| {
            builder.edge(from_version.as_str(), to_version.as_str())
        })
        .build()?;
    let orchestrator = MigrationOrchestrator::new(
        Arc::new(graph),
        Arc::new(world.registry()?),
        UpgradeWorld::collaborators(),
        Arc::new(UpgradeWorld::journal()),
        Arc::new(DefaultClock),
    );
    let current = VersionId::new(from)?;
    world.result = Some(run_async(orchestrator.upgrade(&current, &target)));
    Ok(())
}

#[when(r#"the installation upgrades from "{from}" to "{target}""#)]
fn upgrade_to_version(
    world: &mut UpgradeWorld,
    from: String,
    target: String,
) -> Result<(), eyre::Report> {
    let version = VersionId::new(target)?;
    upgrade(world, &from, Target::Version(version))
}

#[when(r#"the installation upgrades from "{from}" to the latest version"#)]
fn upgrade_to_latest(world: &mut UpgradeWorld, from: String) -> Result<(), eyre::Report> {
    upgrade(world, &from, Target::Latest)
}
