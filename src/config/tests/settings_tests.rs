//! Unit tests for setting maps and source names.

use crate::config::{
    domain::{SettingMap, SourceName, merge_missing},
    ports::ConfigError,
};
use rstest::rstest;

#[rstest]
#[case("app")]
#[case("app-defaults")]
#[case("site_v2.local")]
fn source_names_accept_plain_identifiers(#[case] raw: &str) {
    let name = SourceName::new(raw).expect("name should be valid");
    assert_eq!(name.as_str(), raw);
}

#[rstest]
#[case("")]
#[case(".hidden")]
#[case("../escape")]
#[case("nested/source")]
#[case("spaced name")]
fn source_names_reject_path_like_input(#[case] raw: &str) {
    assert!(matches!(
        SourceName::new(raw),
        Err(ConfigError::InvalidSource(name)) if name == raw
    ));
}

#[test]
fn merge_missing_keeps_existing_values() {
    let defaults = SettingMap::from([
        ("cache".to_owned(), "on".to_owned()),
        ("theme".to_owned(), "light".to_owned()),
    ]);
    let mut current = SettingMap::from([("theme".to_owned(), "dark".to_owned())]);

    let added = merge_missing(&defaults, &mut current);

    assert_eq!(added, vec!["cache".to_owned()]);
    assert_eq!(current.get("theme").map(String::as_str), Some("dark"));
    assert_eq!(current.get("cache").map(String::as_str), Some("on"));
}
