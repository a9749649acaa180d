//! SQL issued against the local catalog.
//!
//! Identifiers are interpolated, not bound: PostgreSQL cannot bind identifiers
//! in DDL. Every identifier here comes from trusted configuration. Feeding
//! untrusted input through these builders needs identifier quoting first.

pub const SCHEMA_EXISTS: &str = "SELECT 1 FROM pg_namespace WHERE nspname = $1";

pub const SERVER_EXISTS: &str = "SELECT 1 FROM pg_foreign_server WHERE srvname = $1";

pub const USER_MAPPING_EXISTS: &str = "SELECT 1 \
     FROM pg_user_mappings um \
     JOIN pg_foreign_server fs ON fs.oid = um.srvid \
     JOIN pg_roles r ON r.oid = um.umuser \
     WHERE fs.srvname = $1 \
     AND r.rolname = $2";

pub const FOREIGN_TABLES_EXIST: &str = "SELECT 1 \
     FROM pg_class c \
     JOIN pg_namespace n ON n.oid = c.relnamespace \
     WHERE n.nspname = $1 \
     AND c.relkind = 'f' \
     LIMIT 1";

pub const RESET_ROLE: &str = "RESET ROLE;";

pub fn create_schema(schema: &str, owner: &str) -> String {
    format!("CREATE SCHEMA {} AUTHORIZATION {};", schema, owner.to_lowercase())
}

pub fn drop_schema(schema: &str) -> String {
    format!("DROP SCHEMA IF EXISTS {} CASCADE;", schema)
}

pub fn create_server(server: &str, wrapper: &str, dbserver: &str) -> String {
    format!(
        "CREATE SERVER {} FOREIGN DATA WRAPPER {} OPTIONS (dbserver '{}');",
        server, wrapper, dbserver
    )
}

pub fn drop_server(server: &str) -> String {
    format!("DROP SERVER IF EXISTS {} CASCADE;", server)
}

pub fn create_user_mapping(pg_user: &str, server: &str, remote_user: &str, password: &str) -> String {
    format!(
        "CREATE USER MAPPING FOR {} SERVER {} OPTIONS (user '{}', password '{}');",
        pg_user, server, remote_user, password
    )
}

pub fn set_role(role: &str) -> String {
    format!("SET ROLE {};", role.to_lowercase())
}

/// The remote schema name is quoted so Oracle's upper-case name survives.
pub fn import_foreign_schema(remote_schema: &str, server: &str, schema: &str) -> String {
    format!(
        "IMPORT FOREIGN SCHEMA \"{}\" FROM SERVER {} INTO {} OPTIONS (case 'lower');",
        remote_schema, server, schema
    )
}

pub fn grant_superuser(role: &str) -> String {
    format!("ALTER ROLE {} WITH SUPERUSER;", role.to_lowercase())
}

pub fn revoke_superuser(role: &str) -> String {
    format!("ALTER ROLE {} WITH NOSUPERUSER;", role.to_lowercase())
}
