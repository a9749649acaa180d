//! In-memory stand-in for the PostgreSQL catalog.
//!
//! Understands exactly the statements the engine issues, folds unquoted
//! identifiers to lower case like PostgreSQL, and rejects duplicate creations
//! so a missing existence check shows up as an error.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use fdwctl::catalog::{CatalogDriver, CatalogRow};
use fdwctl::config::loader::parse_config;
use fdwctl::config::types::FdwConfig;
use fdwctl::error::{FdwError, Result};

/// Durable catalog objects. Equality ignores the statement log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogState {
    /// schema -> owner
    pub schemas: BTreeMap<String, String>,
    /// server -> dbserver option
    pub servers: BTreeMap<String, String>,
    /// (server, local user)
    pub mappings: BTreeSet<(String, String)>,
    /// schema -> (remote schema, server)
    pub imports: BTreeMap<String, (String, String)>,
    pub superusers: BTreeSet<String>,
    pub current_role: Option<String>,
}

#[derive(Default)]
pub struct MemoryCatalog {
    state: Mutex<CatalogState>,
    statements: Mutex<Vec<String>>,
    rows: Mutex<VecDeque<CatalogRow>>,
    notices: Mutex<Vec<String>>,
    failures: Mutex<Vec<String>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any later statement containing `fragment` fails without effect.
    pub fn fail_when(&self, fragment: &str) {
        self.failures.lock().unwrap().push(fragment.to_string());
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    pub fn state(&self) -> CatalogState {
        self.state.lock().unwrap().clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    pub fn clear_statements(&self) {
        self.statements.lock().unwrap().clear();
    }

    pub fn count_starting_with(&self, prefix: &str) -> usize {
        self.statements
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.starts_with(prefix))
            .count()
    }

    fn apply(&self, statement: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        let mut state = self.state.lock().unwrap();
        let tokens: Vec<&str> = statement.split_whitespace().collect();
        let one = || vec![CatalogRow::new(vec![Some("1".to_string())])];
        let found = |hit: bool| if hit { one() } else { Vec::new() };

        if statement.starts_with("SELECT 1 FROM pg_namespace") {
            return Ok(found(state.schemas.contains_key(params[0])));
        }
        if statement.starts_with("SELECT 1 FROM pg_foreign_server") {
            return Ok(found(state.servers.contains_key(params[0])));
        }
        if statement.starts_with("SELECT 1 FROM pg_user_mappings") {
            let key = (params[0].to_string(), params[1].to_string());
            return Ok(found(state.mappings.contains(&key)));
        }
        if statement.starts_with("SELECT 1 FROM pg_class") {
            return Ok(found(state.imports.contains_key(params[0])));
        }

        match tokens.as_slice() {
            ["CREATE", "SCHEMA", schema, "AUTHORIZATION", owner] => {
                let schema = ident(schema);
                if state.schemas.contains_key(&schema) {
                    return Err(duplicate("schema", &schema));
                }
                state.schemas.insert(schema, ident(owner));
            }
            ["DROP", "SCHEMA", "IF", "EXISTS", schema, "CASCADE;"] => {
                let schema = ident(schema);
                state.schemas.remove(&schema);
                state.imports.remove(&schema);
            }
            ["CREATE", "SERVER", server, "FOREIGN", "DATA", "WRAPPER", _, "OPTIONS", "(dbserver", dbserver] => {
                let server = ident(server);
                if state.servers.contains_key(&server) {
                    return Err(duplicate("server", &server));
                }
                let dbserver = dbserver.trim_end_matches(");").trim_matches('\'').to_string();
                state.servers.insert(server, dbserver);
            }
            ["DROP", "SERVER", "IF", "EXISTS", server, "CASCADE;"] => {
                let server = ident(server);
                state.servers.remove(&server);
                state.mappings.retain(|(s, _)| s != &server);
            }
            ["CREATE", "USER", "MAPPING", "FOR", user, "SERVER", server, ..] => {
                let key = (ident(server), ident(user));
                if !state.servers.contains_key(&key.0) {
                    return Err(FdwError::catalog(format!("server \"{}\" does not exist", key.0)));
                }
                if !state.mappings.insert(key.clone()) {
                    return Err(duplicate("user mapping", &format!("{}@{}", key.1, key.0)));
                }
            }
            ["SET", "ROLE", role] => state.current_role = Some(ident(role)),
            ["RESET", "ROLE;"] => state.current_role = None,
            ["IMPORT", "FOREIGN", "SCHEMA", remote, "FROM", "SERVER", server, "INTO", schema, ..] => {
                let (remote, server, schema) = (ident(remote), ident(server), ident(schema));
                if !state.servers.contains_key(&server) {
                    return Err(FdwError::catalog(format!("server \"{}\" does not exist", server)));
                }
                if !state.schemas.contains_key(&schema) {
                    return Err(FdwError::catalog(format!("schema \"{}\" does not exist", schema)));
                }
                if state.imports.contains_key(&schema) {
                    return Err(duplicate("foreign table set in", &schema));
                }
                self.notices
                    .lock()
                    .unwrap()
                    .push(format!("NOTICE: imported schema {} into {}", remote, schema));
                state.imports.insert(schema, (remote, server));
            }
            ["ALTER", "ROLE", role, "WITH", "SUPERUSER;"] => {
                state.superusers.insert(ident(role));
            }
            ["ALTER", "ROLE", role, "WITH", "NOSUPERUSER;"] => {
                state.superusers.remove(&ident(role));
            }
            _ => {
                return Err(FdwError::catalog(format!(
                    "unexpected statement: {}",
                    statement
                )))
            }
        }
        Ok(Vec::new())
    }
}

/// Fold an identifier token the way PostgreSQL does.
fn ident(token: &str) -> String {
    let token = token.trim_end_matches(';');
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        token[1..token.len() - 1].to_string()
    } else {
        token.to_lowercase()
    }
}

fn duplicate(kind: &str, name: &str) -> FdwError {
    FdwError::catalog(format!("{} \"{}\" already exists", kind, name))
}

#[async_trait]
impl CatalogDriver for MemoryCatalog {
    async fn execute(&self, statement: &str, params: &[&str]) -> Result<()> {
        let statement = statement.split_whitespace().collect::<Vec<_>>().join(" ");
        self.statements.lock().unwrap().push(statement.clone());

        let injected = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .any(|f| statement.contains(f.as_str()));
        if injected {
            return Err(FdwError::catalog(format!("injected failure: {}", statement)));
        }

        let rows = self.apply(&statement, params)?;
        *self.rows.lock().unwrap() = rows.into();
        Ok(())
    }

    async fn fetch_one(&self) -> Result<Option<CatalogRow>> {
        Ok(self.rows.lock().unwrap().pop_front())
    }

    async fn drain_notices(&self) -> Result<Vec<String>> {
        Ok(std::mem::take(&mut *self.notices.lock().unwrap()))
    }
}

pub const CONFIG_JSON: &str = r#"{
  "postgres": {
    "host": "localhost",
    "port": 5432,
    "database": "warehouse",
    "user": "postgres",
    "password": "secret"
  },
  "defaults": {
    "schema_name_pattern": "{db_type}_{client}_{database}_{user}",
    "server_name_pattern": "srv_{client}_{database}_{user}",
    "grant_superuser_temporarily": false
  },
  "roles": [
    { "name": "ANALYTICS", "enabled": true, "oracle_password": "an4lyt1cs" },
    { "name": "BILLING", "enabled": true, "oracle_password": "b1ll" },
    { "name": "LEGACY", "enabled": false, "oracle_password": "old" }
  ],
  "targets": [
    {
      "id": "acme-prod",
      "client": "Acme",
      "fdw_type": "oracle",
      "connection": { "jdbc": "jdbc:oracle:thin:@tcp://10.0.0.5:1521/ORCL" },
      "databases": [
        { "name": "SALES", "schemas": ["ANALYTICS", "BILLING", "LEGACY"] }
      ]
    },
    {
      "id": "globex-dev",
      "client": "Globex",
      "fdw_type": "oracle",
      "connection": { "ip": "192.168.1.20", "port": 1522, "service_name": "DEVPDB" },
      "databases": [
        { "name": "HR", "schemas": ["BILLING"] }
      ]
    }
  ]
}"#;

pub fn test_config() -> FdwConfig {
    parse_config(CONFIG_JSON).expect("test config should be valid")
}

pub fn schemas(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
