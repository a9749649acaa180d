use std::future::Future;

use tracing::{error, info, warn};

use super::statements;
use crate::catalog::CatalogDriver;
use crate::error::{FdwError, Result};

/// Run `body` with `SUPERUSER` temporarily granted to `roles`.
///
/// When `enabled` is false this only awaits `body`. Otherwise every granted
/// role is revoked exactly once after `body` finishes, whatever its outcome.
/// A partial grant failure revokes what was already granted and skips `body`.
pub async fn with_elevated_privilege<T, F>(
    catalog: &dyn CatalogDriver,
    roles: &[String],
    enabled: bool,
    body: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if !enabled {
        return body.await;
    }

    let mut granted: Vec<&str> = Vec::with_capacity(roles.len());
    for role in roles {
        info!(role = %role, "Granting SUPERUSER");
        if let Err(e) = catalog.execute(&statements::grant_superuser(role), &[]).await {
            let cleanup = revoke_all(catalog, &granted).await;
            return Err(combine(e, cleanup));
        }
        granted.push(role.as_str());
    }

    let outcome = body.await;
    let cleanup = revoke_all(catalog, &granted).await;

    match outcome {
        Ok(value) => cleanup.map(|_| value),
        Err(e) => Err(combine(e, cleanup)),
    }
}

/// Revoke from every role, continuing past failures. Returns the first failure.
async fn revoke_all(catalog: &dyn CatalogDriver, roles: &[&str]) -> Result<()> {
    let mut first_failure = None;
    for role in roles {
        info!(role = %role, "Revoking SUPERUSER");
        if let Err(e) = catalog.execute(&statements::revoke_superuser(role), &[]).await {
            warn!(role = %role, error = %e, "Failed to revoke SUPERUSER");
            first_failure.get_or_insert(e);
        }
    }
    match first_failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn combine(original: FdwError, cleanup: Result<()>) -> FdwError {
    match cleanup {
        Ok(()) => original,
        Err(cleanup) => {
            error!(error = %original, "Provisioning failed");
            error!(error = %cleanup, "Privilege cleanup failed after provisioning error");
            FdwError::PrivilegeCleanup {
                original: Box::new(original),
                cleanup: Box::new(cleanup),
            }
        }
    }
}
