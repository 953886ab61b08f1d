//! Services running version modules and whole upgrade runs.

mod orchestrator;
mod registry;
mod version_module;

pub use orchestrator::{MigrationOrchestrator, UpgradeError};
pub use registry::{MigrationRegistry, ModuleFactory};
pub use version_module::{VersionModule, VersionModuleBuilder};
