use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::types::FdwConfig;
use super::validator;

/// Overrides `postgres.password` when set, so the secret can stay out of the file.
pub const PASSWORD_ENV: &str = "FDWCTL_PG_PASSWORD";

/// Default location of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/fdwctl.config.json";

/// Read, parse and validate a configuration file.
pub fn load_config(path: &Path) -> Result<FdwConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let mut config = parse_config(&content)
        .with_context(|| format!("Failed to load config file: {}", path.display()))?;

    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        if !password.is_empty() {
            tracing::debug!(env = PASSWORD_ENV, "Using postgres password from environment");
            config.postgres.password = password;
        }
    }

    Ok(config)
}

/// Parse and validate configuration from a JSON string.
pub fn parse_config(content: &str) -> Result<FdwConfig> {
    let config: FdwConfig =
        serde_json::from_str(content).context("Failed to parse configuration JSON")?;
    validator::validate(&config)?;
    tracing::info!(
        roles = config.roles.len(),
        targets = config.targets.len(),
        "Configuration loaded"
    );
    Ok(config)
}
