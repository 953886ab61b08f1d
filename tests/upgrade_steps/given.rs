//! Given steps for upgrade BDD scenarios.

use super::world::UpgradeWorld;
use rstest_bdd_macros::given;

fn split_list(raw: &str, separator: &str) -> Vec<String> {
    raw.split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

#[given(r#"a version graph "{chain}""#)]
fn version_graph(world: &mut UpgradeWorld, chain: String) -> Result<(), eyre::Report> {
    let versions = split_list(&chain, "->");
    if versions.len() < 2 {
        return Err(eyre::eyre!("a version chain needs at least two versions: {chain}"));
    }
    world.edges = versions
        .iter()
        .zip(versions.iter().skip(1))
        .map(|(from, to)| (from.clone(), to.clone()))
        .collect();
    Ok(())
}

#[given(r#"version "{version}" has tasks "{tasks}""#)]
fn version_has_tasks(world: &mut UpgradeWorld, version: String, tasks: String) {
    world.modules.insert(version, split_list(&tasks, ","));
}

#[given(r#"task "{task}" of version "{version}" fails"#)]
fn task_fails(world: &mut UpgradeWorld, task: String, version: String) {
    world.failing.insert((version, task));
}
