//! Setting maps and source naming rules.

mod settings;

pub use settings::{SettingMap, SourceName, merge_missing};
