use std::collections::HashSet;

use super::types::FdwConfig;
use crate::error::{FdwError, Result};

/// Validate the entire configuration for correctness.
pub fn validate(config: &FdwConfig) -> Result<()> {
    validate_defaults(config)?;
    validate_roles(config)?;
    validate_targets(config)?;
    Ok(())
}

fn validate_defaults(config: &FdwConfig) -> Result<()> {
    if config.defaults.schema_name_pattern.trim().is_empty() {
        return Err(FdwError::config("defaults.schema_name_pattern is empty"));
    }
    if config.defaults.server_name_pattern.trim().is_empty() {
        return Err(FdwError::config("defaults.server_name_pattern is empty"));
    }
    Ok(())
}

/// Role names must be present and unique.
fn validate_roles(config: &FdwConfig) -> Result<()> {
    if config.roles.is_empty() {
        return Err(FdwError::config("At least one role must be defined"));
    }

    let mut seen = HashSet::new();
    for role in &config.roles {
        if role.name.trim().is_empty() {
            return Err(FdwError::config("Role missing 'name'"));
        }
        if !seen.insert(role.name.as_str()) {
            return Err(FdwError::config(format!(
                "Role '{}' is defined more than once",
                role.name
            )));
        }
    }
    Ok(())
}

/// Every schema listed under a target database must name a configured role.
fn validate_targets(config: &FdwConfig) -> Result<()> {
    if config.targets.is_empty() {
        return Err(FdwError::config("At least one target must be defined"));
    }

    let role_names: HashSet<&str> = config.roles.iter().map(|r| r.name.as_str()).collect();
    let mut target_ids = HashSet::new();

    for target in &config.targets {
        if !target_ids.insert(target.id.as_str()) {
            return Err(FdwError::config(format!(
                "Target '{}' is defined more than once",
                target.id
            )));
        }

        for db in &target.databases {
            if db.name.trim().is_empty() {
                return Err(FdwError::config(format!(
                    "Database entry missing 'name' in target {}",
                    target.id
                )));
            }
            for schema in &db.schemas {
                if !role_names.contains(schema.as_str()) {
                    return Err(FdwError::config(format!(
                        "Schema '{}' does not exist in roles list",
                        schema
                    )));
                }
            }
        }
    }
    Ok(())
}
