use thiserror::Error;

/// Errors surfaced by the provisioning engine and its collaborators.
#[derive(Error, Debug)]
pub enum FdwError {
    /// Malformed connection string, missing password, bad pattern or any
    /// other problem detectable from configuration alone.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A statement failed inside the catalog session.
    #[error("Catalog operation failed: {0}")]
    Catalog(String),

    /// Revoking elevated privilege failed after the body had already failed.
    #[error("{original} (privilege cleanup also failed: {cleanup})")]
    PrivilegeCleanup {
        original: Box<FdwError>,
        cleanup: Box<FdwError>,
    },
}

impl FdwError {
    pub fn config(msg: impl Into<String>) -> Self {
        FdwError::Configuration(msg.into())
    }

    pub fn catalog(msg: impl Into<String>) -> Self {
        FdwError::Catalog(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, FdwError::Configuration(_))
    }
}

impl From<tokio_postgres::Error> for FdwError {
    fn from(err: tokio_postgres::Error) -> Self {
        match err.as_db_error() {
            Some(db) => FdwError::Catalog(format!(
                "{}: {} ({})",
                db.severity(),
                db.message(),
                db.code().code()
            )),
            None => FdwError::Catalog(err.to_string()),
        }
    }
}

pub type Result<T, E = FdwError> = std::result::Result<T, E>;
