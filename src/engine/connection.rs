use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::config::types::ConnectionConfig;
use crate::error::{FdwError, Result};

/// Canonical remote endpoint derived from a target's connection descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: String,
    pub service: String,
}

impl Endpoint {
    /// `//host:port/service`, the form oracle_fdw expects in `dbserver`.
    pub fn dbserver(&self) -> String {
        format!("//{}:{}/{}", self.host, self.port, self.service)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.host, self.port, self.service)
    }
}

fn jdbc_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"@tcp://([^:/\s]+):([^/\s]+)/(\S+)").expect("static JDBC pattern is valid")
    })
}

/// Normalize a connection descriptor into an [`Endpoint`].
pub fn resolve(connection: &ConnectionConfig) -> Result<Endpoint> {
    match connection {
        ConnectionConfig::Jdbc { jdbc } => parse_jdbc(jdbc),
        ConnectionConfig::Structured {
            ip,
            port,
            service_name,
        } => {
            let endpoint = Endpoint {
                host: ip.trim().to_string(),
                port: port.to_string().trim().to_string(),
                service: service_name.trim().to_string(),
            };
            for (field, value) in [
                ("ip", &endpoint.host),
                ("port", &endpoint.port),
                ("service_name", &endpoint.service),
            ] {
                if value.is_empty() {
                    return Err(FdwError::config(format!(
                        "Connection field '{}' is empty",
                        field
                    )));
                }
            }
            Ok(endpoint)
        }
    }
}

/// Extract `host`, `port` and `service` from `...@tcp://host:port/service`.
pub fn parse_jdbc(jdbc: &str) -> Result<Endpoint> {
    let caps = jdbc_pattern()
        .captures(jdbc)
        .ok_or_else(|| FdwError::config(format!("Invalid JDBC string: {}", jdbc)))?;

    let endpoint = Endpoint {
        host: caps[1].to_string(),
        port: caps[2].to_string(),
        service: caps[3].to_string(),
    };
    debug!(
        host = %endpoint.host,
        port = %endpoint.port,
        service = %endpoint.service,
        "JDBC parsed"
    );
    Ok(endpoint)
}
