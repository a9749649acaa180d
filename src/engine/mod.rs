pub mod connection;
pub mod credentials;
pub mod naming;
pub mod oracle;
pub mod privilege;
pub mod registry;
pub mod statements;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::catalog::CatalogDriver;
use crate::error::{FdwError, Result};

/// What to do with the bridge objects of the selected roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Install,
    Update,
    Remove,
}

impl Action {
    /// Drop schema and server before anything else.
    pub fn tears_down(self) -> bool {
        matches!(self, Action::Update | Action::Remove)
    }

    /// Create schema, server, mappings and import the remote schema.
    pub fn builds(self) -> bool {
        matches!(self, Action::Install | Action::Update)
    }

    /// Map the interactive menu choice (`1`, `2`, `3`) to an action.
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Action::Install),
            "2" => Some(Action::Update),
            "3" => Some(Action::Remove),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Install => write!(f, "install"),
            Action::Update => write!(f, "update"),
            Action::Remove => write!(f, "remove"),
        }
    }
}

impl FromStr for Action {
    type Err = FdwError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "install" => Ok(Action::Install),
            "update" => Ok(Action::Update),
            "remove" => Ok(Action::Remove),
            other => Err(FdwError::config(format!("Unknown action '{}'", other))),
        }
    }
}

/// Counters for one `apply` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplySummary {
    pub action: Action,
    pub roles_processed: usize,
    pub roles_skipped: usize,
    pub schemas_created: usize,
    pub schemas_existing: usize,
    pub servers_created: usize,
    pub servers_existing: usize,
    pub mappings_created: usize,
    pub mappings_existing: usize,
    pub schemas_dropped: usize,
    pub servers_dropped: usize,
    pub imports: usize,
    pub imports_existing: usize,
    pub notices: Vec<String>,
}

impl ApplySummary {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            roles_processed: 0,
            roles_skipped: 0,
            schemas_created: 0,
            schemas_existing: 0,
            servers_created: 0,
            servers_existing: 0,
            mappings_created: 0,
            mappings_existing: 0,
            schemas_dropped: 0,
            servers_dropped: 0,
            imports: 0,
            imports_existing: 0,
            notices: Vec::new(),
        }
    }

    pub fn creations(&self) -> usize {
        self.schemas_created + self.servers_created + self.mappings_created
    }
}

impl fmt::Display for ApplySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.action {
            Action::Install => "Install",
            Action::Update => "Update",
            Action::Remove => "Remove",
        };
        write!(
            f,
            "{} complete! Roles: {} processed, {} skipped",
            action, self.roles_processed, self.roles_skipped
        )?;
        if self.action.tears_down() {
            write!(
                f,
                ". Dropped: {} schema(s), {} server(s)",
                self.schemas_dropped, self.servers_dropped
            )?;
        }
        if self.action.builds() {
            write!(
                f,
                ". Created: {} schema(s), {} server(s), {} user mapping(s); {} import(s)",
                self.schemas_created, self.servers_created, self.mappings_created, self.imports
            )?;
            let existing = self.schemas_existing
                + self.servers_existing
                + self.mappings_existing
                + self.imports_existing;
            if existing > 0 {
                write!(f, "; {} already present", existing)?;
            }
        }
        write!(f, ".")
    }
}

/// Install/update/remove capability of one foreign data wrapper type.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// The `fdw_type` this provisioner handles.
    fn fdw_type(&self) -> &'static str;

    /// Converge the catalog for every enabled role named in `schemas`.
    async fn apply(
        &self,
        catalog: &dyn CatalogDriver,
        database: &str,
        schemas: &[String],
        action: Action,
    ) -> Result<ApplySummary>;

    async fn install(
        &self,
        catalog: &dyn CatalogDriver,
        database: &str,
        schemas: &[String],
    ) -> Result<ApplySummary> {
        self.apply(catalog, database, schemas, Action::Install).await
    }

    async fn update(
        &self,
        catalog: &dyn CatalogDriver,
        database: &str,
        schemas: &[String],
    ) -> Result<ApplySummary> {
        self.apply(catalog, database, schemas, Action::Update).await
    }

    async fn remove(
        &self,
        catalog: &dyn CatalogDriver,
        database: &str,
        schemas: &[String],
    ) -> Result<ApplySummary> {
        self.apply(catalog, database, schemas, Action::Remove).await
    }
}
