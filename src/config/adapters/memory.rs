//! In-memory configuration store for migration tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::{
    domain::{SettingMap, SourceName, merge_missing},
    ports::{ConfigError, ConfigResult, ConfigStore},
};

/// Thread-safe in-memory configuration store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigStore {
    sources: Arc<RwLock<HashMap<SourceName, SettingMap>>>,
}

impl InMemoryConfigStore {
    /// Creates a store without sources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a source with the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSource`] for unusable names.
    pub fn seed<K, V>(
        &self,
        source: &str,
        settings: impl IntoIterator<Item = (K, V)>,
    ) -> ConfigResult<()>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let name = SourceName::new(source)?;
        let map = settings
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.write_sources()?.insert(name, map);
        Ok(())
    }

    /// Returns a copy of a source, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSource`] for unusable names.
    pub fn snapshot(&self, source: &str) -> ConfigResult<Option<SettingMap>> {
        let name = SourceName::new(source)?;
        Ok(self.read_sources()?.get(&name).cloned())
    }

    fn read_sources(&self) -> ConfigResult<RwLockReadGuard<'_, HashMap<SourceName, SettingMap>>> {
        self.sources
            .read()
            .map_err(|err| ConfigError::io(std::io::Error::other(err.to_string())))
    }

    fn write_sources(
        &self,
    ) -> ConfigResult<RwLockWriteGuard<'_, HashMap<SourceName, SettingMap>>> {
        self.sources
            .write()
            .map_err(|err| ConfigError::io(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn read(&self, source: &str, key: &str) -> ConfigResult<Option<String>> {
        let name = SourceName::new(source)?;
        let sources = self.read_sources()?;
        let settings = sources
            .get(&name)
            .ok_or_else(|| ConfigError::MissingSource(source.to_owned()))?;
        Ok(settings.get(key).cloned())
    }

    async fn write(&self, source: &str, key: &str, value: &str) -> ConfigResult<()> {
        let name = SourceName::new(source)?;
        self.write_sources()?
            .entry(name)
            .or_default()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn merge_defaults(&self, defaults: &str, current: &str) -> ConfigResult<Vec<String>> {
        let defaults_name = SourceName::new(defaults)?;
        let current_name = SourceName::new(current)?;
        let mut sources = self.write_sources()?;
        let default_settings = sources
            .get(&defaults_name)
            .cloned()
            .ok_or_else(|| ConfigError::MissingSource(defaults.to_owned()))?;
        let target = sources.entry(current_name).or_default();
        Ok(merge_missing(&default_settings, target))
    }

    async fn add_if_absent(&self, source: &str, key: &str, value: &str) -> ConfigResult<bool> {
        let name = SourceName::new(source)?;
        let mut sources = self.write_sources()?;
        let settings = sources.entry(name).or_default();
        if settings.contains_key(key) {
            return Ok(false);
        }
        settings.insert(key.to_owned(), value.to_owned());
        Ok(true)
    }
}
