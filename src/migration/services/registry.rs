//! Registry mapping versions to module factories.

use super::{VersionModule, VersionModuleBuilder};
use crate::migration::domain::MigrationDomainError;
use crate::version::domain::VersionId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Declares the tasks of one version on a fresh builder.
pub type ModuleFactory = Arc<dyn Fn(VersionModuleBuilder) -> VersionModuleBuilder + Send + Sync>;

/// Version modules known to the orchestrator.
///
/// Each factory is invoked for every run, so modules never share a
/// completed stack between attempts.
#[derive(Clone, Default)]
pub struct MigrationRegistry {
    factories: HashMap<VersionId, ModuleFactory>,
}

impl MigrationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory declaring the tasks of `version`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::DuplicateModule`] when `version`
    /// already has a factory.
    pub fn register<F>(
        &mut self,
        version: VersionId,
        factory: F,
    ) -> Result<(), MigrationDomainError>
    where
        F: Fn(VersionModuleBuilder) -> VersionModuleBuilder + Send + Sync + 'static,
    {
        if self.factories.contains_key(&version) {
            return Err(MigrationDomainError::DuplicateModule(version));
        }
        self.factories.insert(version, Arc::new(factory));
        Ok(())
    }

    /// Registers a factory, consuming and returning the registry.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::DuplicateModule`] when `version`
    /// already has a factory.
    pub fn with_module<F>(
        mut self,
        version: VersionId,
        factory: F,
    ) -> Result<Self, MigrationDomainError>
    where
        F: Fn(VersionModuleBuilder) -> VersionModuleBuilder + Send + Sync + 'static,
    {
        self.register(version, factory)?;
        Ok(self)
    }

    /// Returns `true` when `version` has a factory.
    #[must_use]
    pub fn contains(&self, version: &VersionId) -> bool {
        self.factories.contains_key(version)
    }

    /// Returns registered versions in lexical order.
    #[must_use]
    pub fn versions(&self) -> Vec<&VersionId> {
        let mut versions: Vec<&VersionId> = self.factories.keys().collect();
        versions.sort_by(|left, right| left.as_str().cmp(right.as_str()));
        versions
    }

    /// Builds a fresh module for `version`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::UnregisteredVersion`] when no factory
    /// exists, or the builder's validation error.
    pub fn build(&self, version: &VersionId) -> Result<VersionModule, MigrationDomainError> {
        let factory = self
            .factories
            .get(version)
            .ok_or_else(|| MigrationDomainError::UnregisteredVersion(version.clone()))?;
        factory(VersionModule::builder(version.clone())).build()
    }
}

impl fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationRegistry")
            .field("versions", &self.versions())
            .finish()
    }
}
