use std::time::{Duration, Instant};

use async_trait::async_trait;
use indicatif::ProgressBar;
use tracing::{debug, info};

use super::connection::{self, Endpoint};
use super::credentials::password_for;
use super::naming::{NamingContext, ObjectNames};
use super::privilege::with_elevated_privilege;
use super::statements;
use super::{Action, ApplySummary, Provisioner};
use crate::catalog::CatalogDriver;
use crate::config::types::{Defaults, FdwConfig, RoleConfig, TargetConfig};
use crate::error::Result;

pub const FDW_TYPE: &str = "oracle";

/// Name of the wrapper extension in the local catalog.
const WRAPPER: &str = "oracle_fdw";

/// One selected role and the object names derived for it.
struct RolePlan<'a> {
    role: &'a str,
    names: ObjectNames,
}

/// Provisions oracle_fdw bridges for one target.
pub struct OracleProvisioner {
    defaults: Defaults,
    roles: Vec<RoleConfig>,
    target: TargetConfig,
    endpoint: Endpoint,
}

impl OracleProvisioner {
    /// Resolves the target's connection up front; a bad descriptor fails here.
    pub fn new(config: &FdwConfig, target: &TargetConfig) -> Result<Self> {
        let endpoint = connection::resolve(&target.connection)?;
        Ok(Self {
            defaults: config.defaults.clone(),
            roles: config.roles.clone(),
            target: target.clone(),
            endpoint,
        })
    }

    pub fn boxed(config: &FdwConfig, target: &TargetConfig) -> Result<Box<dyn Provisioner>> {
        Ok(Box::new(Self::new(config, target)?))
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Enabled roles whose name is among the requested schemas, in role order.
    pub fn selected_roles(&self, schemas: &[String]) -> Vec<&RoleConfig> {
        self.roles
            .iter()
            .filter(|r| r.enabled && schemas.iter().any(|s| s == &r.name))
            .collect()
    }

    pub fn object_names(&self, database: &str, role: &str) -> Result<ObjectNames> {
        let ctx = NamingContext {
            db_type: FDW_TYPE,
            database,
            role,
            host: &self.endpoint.host,
            client: &self.target.client,
        };
        ObjectNames::derive(
            &self.defaults.schema_name_pattern,
            &self.defaults.server_name_pattern,
            &ctx,
        )
    }

    async fn converge(
        &self,
        catalog: &dyn CatalogDriver,
        plans: &[RolePlan<'_>],
        action: Action,
        summary: &mut ApplySummary,
    ) -> Result<()> {
        for plan in plans {
            info!(
                role = %plan.role,
                schema = %plan.names.schema,
                server = %plan.names.server,
                action = %action,
                "Processing role"
            );

            if action.tears_down() {
                self.drop_schema(catalog, &plan.names.schema, summary).await?;
                self.drop_server(catalog, &plan.names.server, summary).await?;
            }

            if action.builds() {
                self.create_schema(catalog, &plan.names.schema, plan.role, summary)
                    .await?;
                self.create_server(catalog, &plan.names.server, summary).await?;
                let password = password_for(&self.roles, plan.role)?;
                self.create_user_mappings(catalog, &plan.names.server, plan.role, password, summary)
                    .await?;
                self.import_schema(catalog, &plan.names.server, &plan.names.schema, plan.role, summary)
                    .await?;
            }

            summary.roles_processed += 1;
        }
        Ok(())
    }

    // ─── Catalog Operations ─────────────────────────────────────────────────

    async fn exists(&self, catalog: &dyn CatalogDriver, sql: &str, params: &[&str]) -> Result<bool> {
        catalog.execute(sql, params).await?;
        Ok(catalog.fetch_one().await?.is_some())
    }

    async fn create_schema(
        &self,
        catalog: &dyn CatalogDriver,
        schema: &str,
        owner: &str,
        summary: &mut ApplySummary,
    ) -> Result<()> {
        if self.exists(catalog, statements::SCHEMA_EXISTS, &[schema]).await? {
            info!(schema = %schema, "Schema already exists, skipping creation");
            summary.schemas_existing += 1;
            return Ok(());
        }
        info!(schema = %schema, owner = %owner.to_lowercase(), "Creating schema");
        catalog
            .execute(&statements::create_schema(schema, owner), &[])
            .await?;
        summary.schemas_created += 1;
        Ok(())
    }

    async fn drop_schema(
        &self,
        catalog: &dyn CatalogDriver,
        schema: &str,
        summary: &mut ApplySummary,
    ) -> Result<()> {
        info!(schema = %schema, "Dropping schema");
        catalog.execute(&statements::drop_schema(schema), &[]).await?;
        summary.schemas_dropped += 1;
        Ok(())
    }

    async fn create_server(
        &self,
        catalog: &dyn CatalogDriver,
        server: &str,
        summary: &mut ApplySummary,
    ) -> Result<()> {
        let folded = server.to_lowercase();
        if self.exists(catalog, statements::SERVER_EXISTS, &[folded.as_str()]).await? {
            info!(server = %server, "FDW server already exists, skipping creation");
            summary.servers_existing += 1;
            return Ok(());
        }
        let dbserver = self.endpoint.dbserver();
        info!(server = %server, dbserver = %dbserver, "Creating FDW server");
        catalog
            .execute(&statements::create_server(server, WRAPPER, &dbserver), &[])
            .await?;
        summary.servers_created += 1;
        Ok(())
    }

    async fn drop_server(
        &self,
        catalog: &dyn CatalogDriver,
        server: &str,
        summary: &mut ApplySummary,
    ) -> Result<()> {
        info!(server = %server, "Dropping FDW server");
        catalog.execute(&statements::drop_server(server), &[]).await?;
        summary.servers_dropped += 1;
        Ok(())
    }

    /// Mappings for the administrative user and for the role's own user.
    async fn create_user_mappings(
        &self,
        catalog: &dyn CatalogDriver,
        server: &str,
        role: &str,
        password: &str,
        summary: &mut ApplySummary,
    ) -> Result<()> {
        let folded_server = server.to_lowercase();
        let own_user = role.to_lowercase();

        for pg_user in [self.defaults.admin_user.as_str(), own_user.as_str()] {
            if self
                .exists(
                    catalog,
                    statements::USER_MAPPING_EXISTS,
                    &[folded_server.as_str(), pg_user],
                )
                .await?
            {
                info!(user = %pg_user, server = %server, "User mapping already exists, skipping");
                summary.mappings_existing += 1;
                continue;
            }
            info!(user = %pg_user, server = %server, "Creating user mapping");
            catalog
                .execute(
                    &statements::create_user_mapping(pg_user, server, role, password),
                    &[],
                )
                .await?;
            summary.mappings_created += 1;
        }
        Ok(())
    }

    /// Import runs as the role itself so the foreign tables are owned by it.
    /// A schema that already holds foreign tables is left alone; `update`
    /// refreshes it through teardown.
    async fn import_schema(
        &self,
        catalog: &dyn CatalogDriver,
        server: &str,
        schema: &str,
        role: &str,
        summary: &mut ApplySummary,
    ) -> Result<()> {
        if self
            .exists(catalog, statements::FOREIGN_TABLES_EXIST, &[schema])
            .await?
        {
            info!(schema = %schema, "Foreign tables already imported, skipping");
            summary.imports_existing += 1;
            return Ok(());
        }

        info!(remote_schema = %role, schema = %schema, "Importing Oracle schema");
        let spinner = ProgressBar::new_spinner();
        spinner.set_message(format!("Importing {} into {}", role, schema));
        spinner.enable_steady_tick(Duration::from_millis(120));
        let start = Instant::now();

        let imported = async {
            catalog.execute(&statements::set_role(role), &[]).await?;
            let import = catalog
                .execute(&statements::import_foreign_schema(role, server, schema), &[])
                .await;
            let reset = catalog.execute(statements::RESET_ROLE, &[]).await;
            import.and(reset)
        }
        .await;
        spinner.finish_and_clear();
        imported?;

        info!(
            schema = %schema,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Import completed"
        );
        summary.imports += 1;

        for notice in catalog.drain_notices().await? {
            info!(notice = %notice, "NOTICE");
            summary.notices.push(notice);
        }
        Ok(())
    }
}

#[async_trait]
impl Provisioner for OracleProvisioner {
    fn fdw_type(&self) -> &'static str {
        FDW_TYPE
    }

    async fn apply(
        &self,
        catalog: &dyn CatalogDriver,
        database: &str,
        schemas: &[String],
        action: Action,
    ) -> Result<ApplySummary> {
        let selected = self.selected_roles(schemas);
        let mut summary = ApplySummary::new(action);
        summary.roles_skipped = self.roles.len() - selected.len();

        // Naming and credential problems surface before any catalog mutation.
        let mut plans = Vec::with_capacity(selected.len());
        for role in &selected {
            let names = self.object_names(database, &role.name)?;
            if action.builds() {
                password_for(&self.roles, &role.name)?;
            }
            plans.push(RolePlan {
                role: &role.name,
                names,
            });
        }

        if plans.is_empty() {
            debug!(database = %database, "No enabled role matches the requested schemas");
            return Ok(summary);
        }

        let escalated: Vec<String> = plans.iter().map(|p| p.role.to_string()).collect();
        with_elevated_privilege(
            catalog,
            &escalated,
            self.defaults.grant_superuser_temporarily,
            self.converge(catalog, &plans, action, &mut summary),
        )
        .await?;

        Ok(summary)
    }
}
