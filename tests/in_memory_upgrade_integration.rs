//! End-to-end upgrade tests against in-memory and file-backed adapters.
//!
//! These tests drive the orchestrator with the built-in step kinds so that
//! structural changes, row rewrites, raw statements and configuration
//! patches all pass through the same run and rollback machinery.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use camino::Utf8Path;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::sync::Arc;
use stepladder::{
    config::{adapters::JsonFileConfigStore, ports::ConfigStore},
    migration::{
        adapters::InMemoryJournal,
        domain::{RunStatus, StepError, TaskOutcome, VersionState},
        ports::MigrationJournal,
        services::{MigrationOrchestrator, MigrationRegistry, VersionModuleBuilder},
        steps::{AlterStep, Collaborators, ConfigStep, RewriteStep, StatementStep},
    },
    store::{
        adapters::InMemoryDataStore,
        domain::{FieldKind, FieldSpec, IndexSpec, Predicate, Record},
    },
    version::domain::{Target, VersionGraph, VersionId},
};
use tempfile::TempDir;

const LINEAGE: &str = r#"{
    "edges": [
        {"from": "3.0", "to": "3.1"},
        {"from": "3.1", "to": "3.2"}
    ]
}"#;

struct Installation {
    _config_dir: TempDir,
    store: InMemoryDataStore,
    config: JsonFileConfigStore,
    journal: InMemoryJournal,
    graph: Arc<VersionGraph>,
}

impl Installation {
    fn orchestrator(
        &self,
        registry: MigrationRegistry,
    ) -> MigrationOrchestrator<InMemoryJournal, DefaultClock> {
        MigrationOrchestrator::new(
            Arc::clone(&self.graph),
            Arc::new(registry),
            Collaborators::new(Arc::new(self.store.clone()), Arc::new(self.config.clone())),
            Arc::new(self.journal.clone()),
            Arc::new(DefaultClock),
        )
    }

    fn email_length(&self) -> Option<u32> {
        self.store
            .fields("users")
            .expect("users collection exists")
            .into_iter()
            .find(|field| field.name == "email")
            .and_then(|field| match field.kind {
                FieldKind::Text { max_len } => max_len,
                _ => None,
            })
    }
}

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn version(raw: &str) -> VersionId {
    VersionId::new(raw).expect("valid version identifier")
}

#[fixture]
fn installation() -> Installation {
    let config_dir = tempfile::tempdir().expect("temporary directory should be created");
    std::fs::write(
        config_dir.path().join("defaults.json"),
        r#"{"cache": "on", "theme": "light"}"#,
    )
    .expect("defaults should be written");
    std::fs::write(
        config_dir.path().join("site.json"),
        r#"{"theme": "dark", "editor": "classic"}"#,
    )
    .expect("site config should be written");
    let path = Utf8Path::from_path(config_dir.path()).expect("temporary path should be UTF-8");
    let config = JsonFileConfigStore::open(path).expect("config directory should open");

    let store = InMemoryDataStore::new();
    store
        .create_collection(
            "users",
            [
                FieldSpec::new("id", FieldKind::Integer).required(),
                FieldSpec::text("email", 100),
            ],
        )
        .expect("users collection should be created");
    store
        .seed(
            "users",
            [
                record(json!({"id": 1, "email": "Ada@Example.com"})),
                record(json!({"id": 2, "email": "grace@example.com"})),
            ],
        )
        .expect("users should be seeded");

    let graph = VersionGraph::from_json_str(LINEAGE).expect("lineage should parse");
    Installation {
        _config_dir: config_dir,
        store,
        config,
        journal: InMemoryJournal::new(),
        graph: Arc::new(graph),
    }
}

fn lowercase_email(row: &Record) -> Result<Value, StepError> {
    row.get("email")
        .and_then(Value::as_str)
        .map(|email| Value::String(email.to_lowercase()))
        .ok_or_else(|| StepError::failed("email missing"))
}

fn module_3_1(builder: VersionModuleBuilder) -> VersionModuleBuilder {
    builder
        .task(
            "add-nickname",
            AlterStep::add_field("users", FieldSpec::text("nickname", 32).with_default("")),
        )
        .task(
            "normalise-email",
            RewriteStep::new("users", "id", "email", lowercase_email),
        )
        .task(
            "merge-site-defaults",
            ConfigStep::merge_defaults("defaults", "site"),
        )
        .task(
            "stamp-schema",
            StatementStep::new("COMMENT ON TABLE {{ table }} IS 'schema {{ version }}'")
                .with_undo("COMMENT ON TABLE {{ table }} IS NULL")
                .with_parameter("table", "users"),
        )
}

fn module_3_2(builder: VersionModuleBuilder) -> VersionModuleBuilder {
    builder
        .task("widen-email", AlterStep::resize_field("users", "email", 100, 254))
        .task(
            "block-editor",
            ConfigStep::set("site", "editor", "blocks").restoring("classic"),
        )
        .task(
            "index-nickname",
            AlterStep::add_index(
                "users",
                IndexSpec::new("users_nickname_idx", ["nickname"]).unique(),
            ),
        )
}

fn broken_module_3_2(builder: VersionModuleBuilder) -> VersionModuleBuilder {
    module_3_2(builder).task(
        "index-avatar",
        AlterStep::add_index("users", IndexSpec::new("users_avatar_idx", ["avatar"])),
    )
}

fn registry(
    second: fn(VersionModuleBuilder) -> VersionModuleBuilder,
) -> MigrationRegistry {
    MigrationRegistry::new()
        .with_module(version("3.1"), module_3_1)
        .and_then(|registry| registry.with_module(version("3.2"), second))
        .expect("modules should register")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn upgrade_applies_every_step_kind(installation: Installation) -> eyre::Result<()> {
    let orchestrator = installation.orchestrator(registry(module_3_2));

    let report = orchestrator.upgrade(&version("3.0"), &Target::Latest).await?;

    eyre::ensure!(report.status() == RunStatus::Completed);
    eyre::ensure!(report.reached() == &version("3.2"));

    let users = installation.store.records("users")?;
    eyre::ensure!(users.iter().all(|row| row.get("nickname") == Some(&json!(""))));
    eyre::ensure!(
        users
            .iter()
            .filter_map(|row| row.get("email").and_then(Value::as_str))
            .all(|email| email == email.to_lowercase())
    );
    eyre::ensure!(installation.email_length() == Some(254));
    eyre::ensure!(installation.store.indexes("users")?.len() == 1);
    eyre::ensure!(
        installation.store.statements()?
            == vec!["COMMENT ON TABLE users IS 'schema 3.1'".to_owned()]
    );

    eyre::ensure!(installation.config.read("site", "cache").await? == Some("on".to_owned()));
    eyre::ensure!(installation.config.read("site", "theme").await? == Some("dark".to_owned()));
    eyre::ensure!(installation.config.read("site", "editor").await? == Some("blocks".to_owned()));

    let entries = installation.journal.entries_for(report.run_id()).await?;
    eyre::ensure!(entries.len() == 13);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_prerequisite_rolls_back_failing_version(
    installation: Installation,
) -> eyre::Result<()> {
    let orchestrator = installation.orchestrator(registry(broken_module_3_2));

    let report = orchestrator.upgrade(&version("3.0"), &Target::Latest).await?;

    eyre::ensure!(report.status() == RunStatus::Aborted);
    eyre::ensure!(report.reached() == &version("3.1"));
    eyre::ensure!(
        report.version(&version("3.1")).map(|entry| entry.state()) == Some(VersionState::Completed)
    );
    let failed = report
        .version(&version("3.2"))
        .ok_or_else(|| eyre::eyre!("3.2 should be reported"))?;
    eyre::ensure!(failed.state() == VersionState::RolledBack);
    eyre::ensure!(failed.outcome_of("widen-email") == Some(TaskOutcome::Undone));
    eyre::ensure!(failed.outcome_of("block-editor") == Some(TaskOutcome::Undone));
    eyre::ensure!(failed.outcome_of("index-nickname") == Some(TaskOutcome::Undone));
    eyre::ensure!(failed.outcome_of("index-avatar") == Some(TaskOutcome::Failed));

    let failure = report
        .failure()
        .ok_or_else(|| eyre::eyre!("aborted run should carry its failure"))?;
    eyre::ensure!(failure.error.is_missing_prerequisite());

    eyre::ensure!(installation.email_length() == Some(100));
    eyre::ensure!(installation.store.indexes("users")?.is_empty());
    eyre::ensure!(
        installation.config.read("site", "editor").await? == Some("classic".to_owned())
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn upgrade_from_latest_is_a_no_op(installation: Installation) -> eyre::Result<()> {
    let orchestrator = installation.orchestrator(registry(module_3_2));

    let report = orchestrator.upgrade(&version("3.2"), &Target::Latest).await?;

    eyre::ensure!(report.is_completed());
    eyre::ensure!(report.versions().is_empty());
    eyre::ensure!(installation.store.write_count()? == 0);
    eyre::ensure!(installation.store.statements()?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stopping_at_an_intermediate_target(installation: Installation) -> eyre::Result<()> {
    let orchestrator = installation.orchestrator(registry(module_3_2));

    let report = orchestrator
        .upgrade(&version("3.0"), &Target::Version(version("3.1")))
        .await?;

    eyre::ensure!(report.is_completed());
    eyre::ensure!(report.path().versions() == [version("3.1")].as_slice());
    eyre::ensure!(installation.email_length() == Some(100));
    let rows = installation
        .store
        .records("users")?
        .into_iter()
        .filter(|row| Predicate::equals("email", "ada@example.com").matches(row))
        .count();
    eyre::ensure!(rows == 1);
    Ok(())
}
