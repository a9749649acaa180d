use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::future;
use tokio::sync::{mpsc, OnceCell};
use tokio_postgres::types::ToSql;
use tokio_postgres::{AsyncMessage, Client, NoTls, Row, SimpleQueryMessage};
use tracing::{debug, error, info};

use super::{CatalogDriver, CatalogRow};
use crate::config::types::PostgresConfig;
use crate::error::{FdwError, Result};

/// Live catalog session on the local PostgreSQL instance.
///
/// The connection is opened on first use and kept for the lifetime of the
/// value. Server notices are forwarded by the connection task into a channel
/// and handed out by [`CatalogDriver::drain_notices`].
pub struct PgCatalog {
    config: tokio_postgres::Config,
    client: OnceCell<Client>,
    rows: Mutex<VecDeque<CatalogRow>>,
    notice_tx: mpsc::UnboundedSender<String>,
    notice_rx: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl PgCatalog {
    pub fn new(pg: &PostgresConfig) -> Self {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&pg.host)
            .port(pg.port)
            .dbname(&pg.database)
            .user(&pg.user)
            .password(&pg.password)
            .application_name("fdwctl");

        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        Self {
            config,
            client: OnceCell::new(),
            rows: Mutex::new(VecDeque::new()),
            notice_tx,
            notice_rx: Mutex::new(notice_rx),
        }
    }

    async fn client(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<Client> {
        info!(
            host = ?self.config.get_hosts(),
            dbname = ?self.config.get_dbname(),
            "Connecting to PostgreSQL"
        );
        let (client, mut connection) = self.config.connect(NoTls).await?;

        let tx = self.notice_tx.clone();
        tokio::spawn(async move {
            loop {
                match future::poll_fn(|cx| connection.poll_message(cx)).await {
                    Some(Ok(AsyncMessage::Notice(notice))) => {
                        let _ = tx.send(format!("{}: {}", notice.severity(), notice.message()));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!(error = %e, "PostgreSQL connection error");
                        break;
                    }
                    None => break,
                }
            }
        });

        Ok(client)
    }

    fn replace_rows(&self, rows: VecDeque<CatalogRow>) -> Result<()> {
        let mut buffered = self
            .rows
            .lock()
            .map_err(|_| FdwError::catalog("result buffer lock poisoned"))?;
        *buffered = rows;
        Ok(())
    }
}

#[async_trait]
impl CatalogDriver for PgCatalog {
    async fn execute(&self, statement: &str, params: &[&str]) -> Result<()> {
        let client = self.client().await?;
        debug!(statement = %statement.trim(), params = params.len(), "Executing statement");

        let rows: VecDeque<CatalogRow> = if params.is_empty() {
            client
                .simple_query(statement)
                .await?
                .into_iter()
                .filter_map(|message| match message {
                    SimpleQueryMessage::Row(row) => Some(CatalogRow::new(
                        (0..row.len()).map(|i| row.get(i).map(str::to_owned)).collect(),
                    )),
                    _ => None,
                })
                .collect()
        } else {
            let bound: Vec<&(dyn ToSql + Sync)> =
                params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
            client
                .query(statement, &bound)
                .await?
                .iter()
                .map(row_to_text)
                .collect()
        };

        self.replace_rows(rows)
    }

    async fn fetch_one(&self) -> Result<Option<CatalogRow>> {
        let mut buffered = self
            .rows
            .lock()
            .map_err(|_| FdwError::catalog("result buffer lock poisoned"))?;
        Ok(buffered.pop_front())
    }

    async fn drain_notices(&self) -> Result<Vec<String>> {
        let mut rx = self
            .notice_rx
            .lock()
            .map_err(|_| FdwError::catalog("notice channel lock poisoned"))?;
        let mut notices = Vec::new();
        while let Ok(notice) = rx.try_recv() {
            notices.push(notice.trim().to_string());
        }
        Ok(notices)
    }
}

/// Render an extended-protocol row as text. Existence checks only ever
/// select integers, booleans or names.
fn row_to_text(row: &Row) -> CatalogRow {
    let columns = (0..row.len())
        .map(|i| {
            if let Ok(v) = row.try_get::<_, Option<String>>(i) {
                return v;
            }
            if let Ok(v) = row.try_get::<_, Option<i32>>(i) {
                return v.map(|n| n.to_string());
            }
            if let Ok(v) = row.try_get::<_, Option<i64>>(i) {
                return v.map(|n| n.to_string());
            }
            if let Ok(v) = row.try_get::<_, Option<bool>>(i) {
                return v.map(|b| b.to_string());
            }
            Some(String::new())
        })
        .collect();
    CatalogRow::new(columns)
}
