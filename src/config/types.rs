use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Top-Level Config ───────────────────────────────────────────────────────

/// Root configuration as loaded from `fdwctl.config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FdwConfig {
    pub postgres: PostgresConfig,
    pub defaults: Defaults,
    pub roles: Vec<RoleConfig>,
    pub targets: Vec<TargetConfig>,
}

impl FdwConfig {
    pub fn find_target(&self, id: &str) -> Option<&TargetConfig> {
        self.targets.iter().find(|t| t.id == id)
    }
}

/// Local PostgreSQL instance that hosts the foreign tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

/// Naming patterns and engine switches shared by every target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    pub schema_name_pattern: String,
    pub server_name_pattern: String,
    #[serde(default)]
    pub grant_superuser_temporarily: bool,
    /// Local administrative principal that receives a user mapping next to
    /// the role's own user.
    #[serde(default = "default_admin_user")]
    pub admin_user: String,
}

fn default_admin_user() -> String {
    "postgres".to_string()
}

// ─── Roles ──────────────────────────────────────────────────────────────────

/// A database role. The name doubles as the remote Oracle schema it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleConfig {
    pub name: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle_password: Option<String>,
}

// ─── Targets ────────────────────────────────────────────────────────────────

/// A remote database reachable through a foreign data wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub id: String,
    pub client: String,
    pub fdw_type: String,
    pub connection: ConnectionConfig,
    pub databases: Vec<DatabaseConfig>,
}

impl TargetConfig {
    pub fn find_database(&self, name: &str) -> Option<&DatabaseConfig> {
        self.databases.iter().find(|d| d.name == name)
    }
}

/// How to reach the remote database: a JDBC-style URI or discrete fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConnectionConfig {
    Jdbc {
        jdbc: String,
    },
    Structured {
        ip: String,
        port: PortValue,
        service_name: String,
    },
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionConfig::Jdbc { jdbc } => write!(f, "{}", jdbc),
            ConnectionConfig::Structured {
                ip,
                port,
                service_name,
            } => write!(f, "{}:{}/{}", ip, port, service_name),
        }
    }
}

/// Port as written in JSON, either `1521` or `"1521"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PortValue {
    Number(u64),
    Text(String),
}

impl fmt::Display for PortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortValue::Number(n) => write!(f, "{}", n),
            PortValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A database on a target and the role schemas that may be bridged from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub name: String,
    pub schemas: Vec<String>,
}
