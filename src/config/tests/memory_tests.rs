//! Unit tests for the in-memory configuration store.

use crate::config::{
    adapters::InMemoryConfigStore,
    ports::{ConfigError, ConfigStore},
};
use eyre::ensure;
use rstest::{fixture, rstest};

#[fixture]
fn store() -> InMemoryConfigStore {
    let store = InMemoryConfigStore::new();
    store
        .seed("defaults", [("cache", "on"), ("theme", "light")])
        .expect("seeding defaults should succeed");
    store
        .seed("site", [("theme", "dark")])
        .expect("seeding site should succeed");
    store
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn read_returns_value_or_none(store: InMemoryConfigStore) -> eyre::Result<()> {
    ensure!(store.read("site", "theme").await? == Some("dark".to_owned()));
    ensure!(store.read("site", "cache").await?.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn read_from_missing_source_fails(store: InMemoryConfigStore) {
    let result = store.read("absent", "theme").await;

    assert!(matches!(result, Err(ConfigError::MissingSource(name)) if name == "absent"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn write_creates_source_on_demand(store: InMemoryConfigStore) -> eyre::Result<()> {
    store.write("fresh", "mode", "strict").await?;

    ensure!(store.read("fresh", "mode").await? == Some("strict".to_owned()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merge_defaults_adds_only_missing_keys(store: InMemoryConfigStore) -> eyre::Result<()> {
    let added = store.merge_defaults("defaults", "site").await?;

    ensure!(added == vec!["cache".to_owned()]);
    ensure!(store.read("site", "theme").await? == Some("dark".to_owned()));
    ensure!(store.merge_defaults("defaults", "site").await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merge_defaults_requires_defaults_source(store: InMemoryConfigStore) {
    let result = store.merge_defaults("absent", "site").await;

    assert!(matches!(result, Err(ConfigError::MissingSource(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_if_absent_never_overwrites(store: InMemoryConfigStore) -> eyre::Result<()> {
    ensure!(!store.add_if_absent("site", "theme", "light").await?);
    ensure!(store.add_if_absent("site", "locale", "en").await?);
    ensure!(store.read("site", "theme").await? == Some("dark".to_owned()));
    ensure!(store.read("site", "locale").await? == Some("en".to_owned()));
    Ok(())
}
