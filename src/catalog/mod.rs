pub mod postgres;

use async_trait::async_trait;

use crate::error::Result;

/// One result row, every column rendered as text (`None` for SQL NULL).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogRow {
    pub columns: Vec<Option<String>>,
}

impl CatalogRow {
    pub fn new(columns: Vec<Option<String>>) -> Self {
        Self { columns }
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.columns.get(idx).and_then(|c| c.as_deref())
    }
}

/// Query-execution capability the engine issues catalog mutations through.
///
/// Implementations keep one session for their whole lifetime. Methods take
/// `&self` so a session can be shared by the escalation scope and the body
/// it wraps.
#[async_trait]
pub trait CatalogDriver: Send + Sync {
    /// Run one statement. Parameters are bound, never interpolated; with no
    /// parameters the statement may contain several commands. Replaces any
    /// rows buffered by the previous statement.
    async fn execute(&self, statement: &str, params: &[&str]) -> Result<()>;

    /// Next buffered row of the last statement.
    async fn fetch_one(&self) -> Result<Option<CatalogRow>>;

    /// Take every informational notice the server sent since the last drain.
    async fn drain_notices(&self) -> Result<Vec<String>>;
}
