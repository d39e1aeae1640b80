//! Storage facade.
//!
//! [`RecordStore`] is the one entry point callers use. It owns the backend
//! chosen at initialization and applies the error policy: reads degrade to
//! empty or absent results, writes surface their errors.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backends::{CallContext, CancelHandle, StorageBackend};
use crate::config::Config;
use crate::core::{Record, RecordChanges, RecordDraft, RecordId, SearchQuery, UpdatedRecord};
use crate::discovery::{default_key_value_store, select_backend, BackendKind};
use crate::error::{FailOpen, Result};
use crate::storage::KeyValueStore;

/// Which backend is active, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendStatus {
    pub is_connected: bool,
    pub backend_type: BackendKind,
    pub name: String,
}

/// The record store.
pub struct RecordStore {
    backend: Box<dyn StorageBackend>,
    database_name: String,
    call_timeout: Duration,
    cancel: CancelHandle,
}

impl RecordStore {
    /// Create a store over an already-selected backend.
    pub fn new(backend: Box<dyn StorageBackend>, config: &Config) -> Self {
        Self {
            backend,
            database_name: config.database_name.clone(),
            call_timeout: config.api.call_timeout(),
            cancel: CancelHandle::new(),
        }
    }

    /// Probe the database API and build a store on whichever backend answers.
    ///
    /// Never fails: an unreachable API selects the local fallback.
    pub async fn initialize(config: &Config) -> Self {
        Self::initialize_with(config, default_key_value_store(config)).await
    }

    /// Like [`initialize`](Self::initialize), with an explicit fallback medium.
    pub async fn initialize_with(config: &Config, store: Arc<dyn KeyValueStore>) -> Self {
        let backend = select_backend(config, store).await;
        Self::new(backend, config)
    }

    /// Owner of the cancel signal shared by every call this store makes.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    fn context(&self) -> CallContext {
        CallContext::new(self.call_timeout).with_token(self.cancel.token())
    }

    /// Store a new record.
    pub async fn create(&self, draft: &RecordDraft) -> Result<Record> {
        draft.validate()?;
        let record = self.backend.create(draft, &self.context()).await?;
        debug!(backend = self.backend.name(), id = %record.id, "created record");
        Ok(record)
    }

    /// Replace the editable fields of an existing record.
    pub async fn update(&self, changes: &RecordChanges) -> Result<UpdatedRecord> {
        changes.fields.validate()?;
        self.backend.update(changes, &self.context()).await
    }

    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        self.backend.delete(id, &self.context()).await
    }

    /// All records, newest first. Empty if the backend fails.
    pub async fn list(&self) -> Vec<Record> {
        self.backend
            .list(&self.context())
            .await
            .fail_open_default("failed to list records")
    }

    /// One record by id. `None` if absent or if the backend fails.
    pub async fn get_by_id(&self, id: &RecordId) -> Option<Record> {
        self.backend
            .get(id, &self.context())
            .await
            .fail_open_default("failed to get record")
    }

    /// Records matching `query`, newest first. Empty if the backend fails.
    pub async fn search(&self, query: &SearchQuery) -> Vec<Record> {
        self.backend
            .search(query, &self.context())
            .await
            .fail_open_default("failed to search records")
    }

    pub fn status(&self) -> BackendStatus {
        let backend_type = self.backend.kind();
        BackendStatus {
            is_connected: backend_type == BackendKind::Database,
            backend_type,
            name: self.database_name.clone(),
        }
    }

    /// Remove every record, returning how many were removed.
    ///
    /// On the database backend this deletes one record at a time. A failure
    /// part way leaves the remaining records in place and is reported as
    /// `PartialClear`.
    pub async fn clear_all(&self) -> Result<usize> {
        self.backend.clear_all(&self.context()).await
    }
}
