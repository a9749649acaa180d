use std::sync::OnceLock;

use regex::Regex;

use crate::error::{FdwError, Result};

/// Inputs substituted into the schema and server name patterns.
#[derive(Debug, Clone)]
pub struct NamingContext<'a> {
    pub db_type: &'a str,
    pub database: &'a str,
    pub role: &'a str,
    pub host: &'a str,
    pub client: &'a str,
}

/// Derived object names for one `(database, role)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectNames {
    pub schema: String,
    pub server: String,
}

impl ObjectNames {
    pub fn derive(schema_pattern: &str, server_pattern: &str, ctx: &NamingContext<'_>) -> Result<Self> {
        Ok(Self {
            schema: schema_name(schema_pattern, ctx)?,
            server: server_name(server_pattern, ctx)?,
        })
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([^{}]*)\}").expect("static placeholder pattern is valid"))
}

/// Local schema name. Every substitution and the result are lower-cased.
pub fn schema_name(pattern: &str, ctx: &NamingContext<'_>) -> Result<String> {
    let name = substitute(pattern, |key| {
        lookup(key, ctx).map(|value| value.to_lowercase())
    })?;
    Ok(name.to_lowercase())
}

/// Foreign server name. Substitutions and pattern casing are kept as authored;
/// the name is always used unquoted, so PostgreSQL folds it.
pub fn server_name(pattern: &str, ctx: &NamingContext<'_>) -> Result<String> {
    substitute(pattern, |key| lookup(key, ctx))
}

fn lookup(key: &str, ctx: &NamingContext<'_>) -> Option<String> {
    let value = match key {
        "db_type" => ctx.db_type.to_string(),
        "database" => ctx.database.to_string(),
        "role" | "user" => ctx.role.to_string(),
        "host" | "ip" => ctx.host.replace('.', "_"),
        "client" => ctx.client.to_string(),
        _ => return None,
    };
    Some(value)
}

fn substitute<F>(pattern: &str, resolve: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(pattern.len());
    let mut last = 0;
    for caps in placeholder_pattern().captures_iter(pattern) {
        let whole = caps.get(0).expect("capture group 0 always matches");
        let key = &caps[1];
        let value = resolve(key).ok_or_else(|| {
            FdwError::config(format!(
                "Unknown placeholder '{{{}}}' in name pattern '{}'",
                key, pattern
            ))
        })?;
        out.push_str(&pattern[last..whole.start()]);
        out.push_str(&value);
        last = whole.end();
    }
    out.push_str(&pattern[last..]);
    Ok(out)
}
