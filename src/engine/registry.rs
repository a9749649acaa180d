use std::collections::BTreeMap;

use tracing::info;

use super::oracle::{self, OracleProvisioner};
use super::{Action, ApplySummary, Provisioner};
use crate::catalog::CatalogDriver;
use crate::config::types::{FdwConfig, TargetConfig};
use crate::error::{FdwError, Result};

/// Builds the provisioner for one target.
pub type ProvisionerFactory = fn(&FdwConfig, &TargetConfig) -> Result<Box<dyn Provisioner>>;

/// Provisioner factories keyed by `fdw_type`.
pub struct ProvisionerRegistry {
    factories: BTreeMap<String, ProvisionerFactory>,
}

impl Default for ProvisionerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(oracle::FDW_TYPE, OracleProvisioner::boxed);
        registry
    }
}

impl ProvisionerRegistry {
    /// Registry with every built-in wrapper type.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register (or replace) the factory for `fdw_type`.
    pub fn register(&mut self, fdw_type: &str, factory: ProvisionerFactory) {
        self.factories.insert(fdw_type.to_string(), factory);
    }

    pub fn fdw_types(&self) -> Vec<&str> {
        self.factories.keys().map(|k| k.as_str()).collect()
    }

    pub fn build(&self, config: &FdwConfig, target: &TargetConfig) -> Result<Box<dyn Provisioner>> {
        let factory = self.factories.get(&target.fdw_type).ok_or_else(|| {
            FdwError::config(format!(
                "Unsupported fdw_type '{}' for target '{}' (supported: {})",
                target.fdw_type,
                target.id,
                self.fdw_types().join(", ")
            ))
        })?;
        factory(config, target)
    }
}

/// Entry point used by the CLI: dispatches one action for one target.
pub struct FdwManager<'a> {
    config: &'a FdwConfig,
    registry: ProvisionerRegistry,
}

impl<'a> FdwManager<'a> {
    pub fn new(config: &'a FdwConfig) -> Self {
        Self::with_registry(config, ProvisionerRegistry::new())
    }

    pub fn with_registry(config: &'a FdwConfig, registry: ProvisionerRegistry) -> Self {
        Self { config, registry }
    }

    pub async fn execute(
        &self,
        catalog: &dyn CatalogDriver,
        target: &TargetConfig,
        database: &str,
        schemas: &[String],
        action: Action,
    ) -> Result<ApplySummary> {
        let provisioner = self.registry.build(self.config, target)?;
        info!(
            target = %target.id,
            fdw_type = provisioner.fdw_type(),
            database = %database,
            schemas = ?schemas,
            action = %action,
            "Executing FDW action"
        );

        match action {
            Action::Install => provisioner.install(catalog, database, schemas).await,
            Action::Update => provisioner.update(catalog, database, schemas).await,
            Action::Remove => provisioner.remove(catalog, database, schemas).await,
        }
    }
}
