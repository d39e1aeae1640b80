//! Database API backend.
//!
//! Talks to the record service over HTTP:
//! - `GET  <base>/status` liveness probe
//! - `GET  <base>/kayitlar` list, `GET <base>/kayitlar/search` filtered list
//! - `GET  <base>/kayitlar/:id`, `POST <base>/kayitlar`
//! - `PUT  <base>/kayitlar/:id`, `DELETE <base>/kayitlar/:id`
//!
//! Rows come back with snake_case column names and are renamed through
//! [`fields::from_wire`] before deserializing. Create and update responses
//! are already camelCase and pass through the same function unchanged.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::backends::call::CallContext;
use crate::backends::traits::StorageBackend;
use crate::core::fields;
use crate::core::{Record, RecordChanges, RecordDraft, RecordId, SearchQuery, UpdatedRecord};
use crate::discovery::BackendKind;
use crate::error::{Result, StorageError};

/// Database API backend.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    base_url: String,
    http: reqwest::Client,
}

impl RemoteBackend {
    /// Create a backend for the API rooted at `base_url` (e.g. `http://host:3000/api`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(StorageError::config("API base URL is empty"));
        }
        Ok(Self {
            base_url: trimmed.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Liveness probe: a 2xx response whose body parses as JSON.
    ///
    /// Returns the parsed status body.
    pub async fn probe(&self, ctx: &CallContext) -> Result<Value> {
        ctx.run("status", async {
            let resp = self.request(Method::GET, "/status").send().await?;
            let resp = ensure_success(resp, "status").await?;
            let body = resp.text().await?;
            Ok(serde_json::from_str::<Value>(&body)?)
        })
        .await
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.http.request(method, url)
    }

    fn record_path(id: &RecordId) -> String {
        format!("/kayitlar/{}", id)
    }
}

#[async_trait]
impl StorageBackend for RemoteBackend {
    async fn create(&self, draft: &RecordDraft, ctx: &CallContext) -> Result<Record> {
        ctx.run("create", async {
            let resp = self
                .request(Method::POST, "/kayitlar")
                .json(draft)
                .send()
                .await?;
            let resp = ensure_success(resp, "create").await?;
            let body: Value = resp.json().await?;

            // The create response omits tonaj; overlay it on what was sent.
            let mut merged = serde_json::to_value(draft)?;
            if let (Value::Object(target), Value::Object(echoed)) =
                (&mut merged, fields::from_wire(body))
            {
                target.extend(echoed);
            }
            let record: Record = serde_json::from_value(merged)?;
            debug!(id = %record.id, "record created");
            Ok(record)
        })
        .await
    }

    async fn update(&self, changes: &RecordChanges, ctx: &CallContext) -> Result<UpdatedRecord> {
        ctx.run("update", async {
            let resp = self
                .request(Method::PUT, &Self::record_path(&changes.id))
                .json(changes)
                .send()
                .await?;
            if resp.status() == StatusCode::NOT_FOUND {
                return Err(StorageError::not_found(&changes.id));
            }
            let resp = ensure_success(resp, "update").await?;
            let body: Value = resp.json().await?;
            Ok(serde_json::from_value(fields::from_wire(body))?)
        })
        .await
    }

    async fn delete(&self, id: &RecordId, ctx: &CallContext) -> Result<()> {
        ctx.run("delete", async {
            let resp = self
                .request(Method::DELETE, &Self::record_path(id))
                .send()
                .await?;
            if resp.status() == StatusCode::NOT_FOUND {
                return Err(StorageError::not_found(id));
            }
            ensure_success(resp, "delete").await?;
            Ok(())
        })
        .await
    }

    async fn list(&self, ctx: &CallContext) -> Result<Vec<Record>> {
        ctx.run("list", async {
            let resp = self.request(Method::GET, "/kayitlar").send().await?;
            let resp = ensure_success(resp, "list").await?;
            parse_rows(resp.json().await?)
        })
        .await
    }

    async fn get(&self, id: &RecordId, ctx: &CallContext) -> Result<Option<Record>> {
        ctx.run("get", async {
            let resp = self
                .request(Method::GET, &Self::record_path(id))
                .send()
                .await?;
            if resp.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            let resp = ensure_success(resp, "get").await?;
            let row: Value = resp.json().await?;
            Ok(Some(serde_json::from_value(fields::from_wire(row))?))
        })
        .await
    }

    async fn search(&self, query: &SearchQuery, ctx: &CallContext) -> Result<Vec<Record>> {
        ctx.run("search", async {
            let resp = self
                .request(Method::GET, "/kayitlar/search")
                .query(&search_params(query))
                .send()
                .await?;
            let resp = ensure_success(resp, "search").await?;
            let rows = parse_rows(resp.json().await?)?;
            Ok(rows.into_iter().filter(|r| query.matches(r)).collect())
        })
        .await
    }

    /// The API has no bulk delete: list, then delete one by one.
    ///
    /// Every id is attempted. Ids that fail stay in the table and are reported
    /// through `PartialClear`; nothing already deleted is restored.
    async fn clear_all(&self, ctx: &CallContext) -> Result<usize> {
        let records = self.list(ctx).await?;
        let mut deleted = 0;
        let mut failed = Vec::new();

        for (i, record) in records.iter().enumerate() {
            if ctx.is_cancelled() {
                failed.extend(records[i..].iter().map(|r| r.id.to_string()));
                break;
            }
            match self.delete(&record.id, ctx).await {
                Ok(()) => deleted += 1,
                Err(err) if err.is_not_found() => {
                    debug!(id = %record.id, "record already gone during clear");
                }
                Err(err) => {
                    warn!(id = %record.id, "clear could not delete record: {}", err);
                    failed.push(record.id.to_string());
                }
            }
        }

        if failed.is_empty() {
            Ok(deleted)
        } else {
            Err(StorageError::PartialClear { deleted, failed })
        }
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Database
    }

    fn name(&self) -> &'static str {
        "database"
    }
}

/// Query string for the search endpoint.
///
/// Only the exact filters go on the wire. The server's `LIKE` folds case for
/// ASCII letters alone and would drop rows the text match keeps (`KİLİT` for
/// `ki`), so the term is always matched client-side.
fn search_params(query: &SearchQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(durum) = query.active_durum() {
        params.push(("filterDurum", durum.to_string()));
    }
    if let Some(vardiya) = query.active_vardiya() {
        params.push(("filterVardiya", vardiya.to_string()));
    }
    params
}

/// Deserialize a row array. Rows that do not parse are skipped and logged.
fn parse_rows(body: Value) -> Result<Vec<Record>> {
    let Value::Array(rows) = fields::from_wire(body) else {
        return Err(StorageError::serde("expected an array of records"));
    };
    Ok(rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<Record>(row) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("skipping unreadable record row: {}", err);
                None
            }
        })
        .collect())
}

async fn ensure_success(resp: reqwest::Response, operation: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    debug!(operation, %status, body, "database API returned an error");
    Err(StorageError::malformed_response(operation, status.as_u16()))
}
