//! Column store adapter (HBase REST gateway)
//!
//! Dense bigram/trigram counts live in one HBase table, one row per n-gram,
//! with the count in a single cell stored as a base-10 integer string.
//!
//! ```text
//! GET http://{host}:{port}/{table}/{row}/{family:qualifier}
//! Accept: application/octet-stream
//!
//! 200 -> raw cell bytes, e.g. b"42"
//! 404 -> no such row or column
//! ```
//!
//! The HTTP client is shared and safe for concurrent requests. No retry
//! is attempted; timeouts come from the client configuration.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::{CellStats, CountBackend, Lookup};
use crate::config::ColumnStoreConfig;
use crate::error::BackendError;

const NAME: &str = "hbase";

pub struct HBaseRestColumnStore {
    http: Client,
    base: Url,
    table: String,
    column: String,
    found: AtomicU64,
    absent: AtomicU64,
    malformed: AtomicU64,
}

impl HBaseRestColumnStore {
    pub fn new(config: &ColumnStoreConfig) -> Result<Self, BackendError> {
        let endpoint = format!("http://{}:{}/", config.host, config.port);
        let base = Url::parse(&endpoint).map_err(|e| BackendError::Endpoint {
            backend: NAME,
            endpoint: endpoint.clone(),
            message: e.to_string(),
        })?;

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| BackendError::connection(NAME, e))?;

        debug!(%base, table = %config.table, column = %config.column, "HBase REST client ready");

        Ok(Self {
            http,
            base,
            table: config.table.clone(),
            column: config.column.clone(),
            found: AtomicU64::new(0),
            absent: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Cell URL with each path segment percent-encoded
    pub fn cell_url(&self, table: &str, row: &str, column: &str) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::Endpoint {
                backend: NAME,
                endpoint: self.base.to_string(),
                message: "base URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend([table, row, column]);
        Ok(url)
    }

    /// Raw bytes of one cell, `None` when the row or column is missing
    pub async fn raw_cell(
        &self,
        table: &str,
        row: &str,
        column: &str,
    ) -> Result<Option<Vec<u8>>, BackendError> {
        let url = self.cell_url(table, row, column)?;

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/octet-stream")
            .send()
            .await
            .map_err(|e| BackendError::connection(NAME, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(BackendError::Status {
                backend: NAME,
                status: status.as_u16(),
                key: row.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::connection(NAME, e))?;
        Ok(Some(body.to_vec()))
    }
}

/// Interpret a cell as a non-negative base-10 integer
pub fn parse_cell(raw: &[u8]) -> Option<u64> {
    std::str::from_utf8(raw).ok()?.trim().parse().ok()
}

#[async_trait]
impl CountBackend for HBaseRestColumnStore {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn count(&self, key: &str) -> Result<Lookup<u64>, BackendError> {
        let Some(raw) = self.raw_cell(&self.table, key, &self.column).await? else {
            self.absent.fetch_add(1, Ordering::Relaxed);
            return Ok(Lookup::NotFound);
        };

        match parse_cell(&raw) {
            Some(count) => {
                self.found.fetch_add(1, Ordering::Relaxed);
                Ok(Lookup::Found(count))
            }
            None => {
                // counted as absent for the caller, tracked separately here
                self.malformed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    ngram = %key,
                    value = %String::from_utf8_lossy(&raw),
                    "Malformed count cell, treating as zero"
                );
                Ok(Lookup::NotFound)
            }
        }
    }

    fn cell_stats(&self) -> Option<CellStats> {
        Some(CellStats {
            found: self.found.load(Ordering::Relaxed),
            absent: self.absent.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        })
    }
}
