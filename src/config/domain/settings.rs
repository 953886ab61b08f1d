//! Flat setting maps shared by configuration adapters.

use crate::config::ports::ConfigError;
use std::collections::BTreeMap;
use std::fmt;

/// Settings of one source, ordered by key.
pub type SettingMap = BTreeMap<String, String>;

/// Validated name of a configuration source.
///
/// Names are plain identifiers so that adapters can map them onto files
/// without escaping: ASCII letters, digits, `-`, `_` and `.` are allowed,
/// and a name may not start with `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceName(String);

impl SourceName {
    /// Validates a source name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSource`] for empty names, names
    /// starting with `.` and names containing other characters.
    pub fn new(raw: &str) -> Result<Self, ConfigError> {
        let valid = !raw.is_empty()
            && !raw.starts_with('.')
            && raw
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'));
        if valid {
            Ok(Self(raw.to_owned()))
        } else {
            Err(ConfigError::InvalidSource(raw.to_owned()))
        }
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Copies every key of `defaults` missing from `current` and returns the
/// copied keys in order. Existing values in `current` are never replaced.
pub fn merge_missing(defaults: &SettingMap, current: &mut SettingMap) -> Vec<String> {
    let mut added = Vec::new();
    for (key, value) in defaults {
        if !current.contains_key(key) {
            current.insert(key.clone(), value.clone());
            added.push(key.clone());
        }
    }
    added
}
