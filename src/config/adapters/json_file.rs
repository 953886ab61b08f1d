//! JSON-file configuration store scoped to one directory.
//!
//! Each source `name` is stored as `name.json` holding a flat object of
//! string values. Writes go to a hidden temporary file first and are then
//! renamed over the source file.

use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io::ErrorKind;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::config::{
    domain::{SettingMap, SourceName, merge_missing},
    ports::{ConfigError, ConfigResult, ConfigStore},
};

/// Configuration store backed by JSON files in a capability directory.
#[derive(Debug, Clone)]
pub struct JsonFileConfigStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    dir: Dir,
    write_lock: Mutex<()>,
}

impl Inner {
    fn lock_writes(&self) -> ConfigResult<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|err| ConfigError::io(std::io::Error::other(err.to_string())))
    }

    fn load(&self, name: &SourceName) -> ConfigResult<Option<SettingMap>> {
        let contents = match self.dir.read_to_string(file_name(name)) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(ConfigError::io(err)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|err| ConfigError::Malformed {
                source_name: name.to_string(),
                message: err.to_string(),
            })
    }

    fn load_required(&self, name: &SourceName) -> ConfigResult<SettingMap> {
        self.load(name)?
            .ok_or_else(|| ConfigError::MissingSource(name.to_string()))
    }

    fn save(&self, name: &SourceName, settings: &SettingMap) -> ConfigResult<()> {
        let body = serde_json::to_string_pretty(settings).map_err(ConfigError::io)?;
        let staging = format!(".{name}.json.tmp");
        self.dir
            .write(&staging, body.as_bytes())
            .map_err(ConfigError::io)?;
        self.dir
            .rename(&staging, &self.dir, file_name(name))
            .map_err(ConfigError::io)?;
        debug!(source = %name, keys = settings.len(), "saved configuration source");
        Ok(())
    }
}

fn file_name(name: &SourceName) -> String {
    format!("{name}.json")
}

impl JsonFileConfigStore {
    /// Opens the directory at `path` with ambient authority.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the directory cannot be opened.
    pub fn open(path: &Utf8Path) -> ConfigResult<Self> {
        let dir = Dir::open_ambient_dir(path, ambient_authority()).map_err(ConfigError::io)?;
        Ok(Self::from_dir(dir))
    }

    /// Wraps an already opened directory.
    #[must_use]
    pub fn from_dir(dir: Dir) -> Self {
        Self {
            inner: Arc::new(Inner {
                dir,
                write_lock: Mutex::new(()),
            }),
        }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ConfigResult<T>
    where
        F: FnOnce(&Inner) -> ConfigResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&inner))
            .await
            .map_err(ConfigError::io)?
    }
}

#[async_trait]
impl ConfigStore for JsonFileConfigStore {
    async fn read(&self, source: &str, key: &str) -> ConfigResult<Option<String>> {
        let name = SourceName::new(source)?;
        let wanted = key.to_owned();
        self.run_blocking(move |inner| {
            let mut settings = inner.load_required(&name)?;
            Ok(settings.remove(&wanted))
        })
        .await
    }

    async fn write(&self, source: &str, key: &str, value: &str) -> ConfigResult<()> {
        let name = SourceName::new(source)?;
        let entry_key = key.to_owned();
        let entry_value = value.to_owned();
        self.run_blocking(move |inner| {
            let _guard = inner.lock_writes()?;
            let mut settings = inner.load(&name)?.unwrap_or_default();
            if settings.get(&entry_key) == Some(&entry_value) {
                return Ok(());
            }
            settings.insert(entry_key, entry_value);
            inner.save(&name, &settings)
        })
        .await
    }

    async fn merge_defaults(&self, defaults: &str, current: &str) -> ConfigResult<Vec<String>> {
        let defaults_name = SourceName::new(defaults)?;
        let current_name = SourceName::new(current)?;
        self.run_blocking(move |inner| {
            let _guard = inner.lock_writes()?;
            let default_settings = inner.load_required(&defaults_name)?;
            let mut settings = inner.load(&current_name)?.unwrap_or_default();
            let added = merge_missing(&default_settings, &mut settings);
            if !added.is_empty() {
                inner.save(&current_name, &settings)?;
            }
            Ok(added)
        })
        .await
    }

    async fn add_if_absent(&self, source: &str, key: &str, value: &str) -> ConfigResult<bool> {
        let name = SourceName::new(source)?;
        let entry_key = key.to_owned();
        let entry_value = value.to_owned();
        self.run_blocking(move |inner| {
            let _guard = inner.lock_writes()?;
            let mut settings = inner.load(&name)?.unwrap_or_default();
            if settings.contains_key(&entry_key) {
                return Ok(false);
            }
            settings.insert(entry_key, entry_value);
            inner.save(&name, &settings)?;
            Ok(true)
        })
        .await
    }
}
