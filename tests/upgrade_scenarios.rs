//! Behaviour tests for version-sequenced upgrades.

mod upgrade_steps;

use rstest_bdd_macros::scenario;
use upgrade_steps::world::{UpgradeWorld, world};

#[scenario(
    path = "tests/features/upgrade.feature",
    name = "Upgrade through every version to the target"
)]
#[tokio::test(flavor = "multi_thread")]
async fn upgrade_through_every_version(world: UpgradeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/upgrade.feature",
    name = "A failing task rolls back its version and halts the run"
)]
#[tokio::test(flavor = "multi_thread")]
async fn failing_task_rolls_back_and_halts(world: UpgradeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/upgrade.feature",
    name = "An installation on the newest version has nothing to do"
)]
#[tokio::test(flavor = "multi_thread")]
async fn newest_version_has_nothing_to_do(world: UpgradeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/upgrade.feature",
    name = "A version without a migration module is rejected before any task runs"
)]
#[tokio::test(flavor = "multi_thread")]
async fn missing_module_is_rejected(world: UpgradeWorld) {
    let _ = world;
}
