use crate::config::types::RoleConfig;
use crate::error::{FdwError, Result};

/// Remote Oracle password for `role_name`.
pub fn password_for<'a>(roles: &'a [RoleConfig], role_name: &str) -> Result<&'a str> {
    roles
        .iter()
        .find(|r| r.name == role_name)
        .and_then(|r| r.oracle_password.as_deref())
        .ok_or_else(|| {
            FdwError::config(format!("Oracle password not defined for role {}", role_name))
        })
}
