//! Local key/value fallback backend.
//!
//! The whole collection lives as one JSON array under a single key, newest
//! record first. Every operation is a read-modify-write of that array, run on
//! the blocking pool so a slow store neither stalls the runtime nor outlives
//! the call deadline.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::backends::call::CallContext;
use crate::backends::traits::StorageBackend;
use crate::config::DEFAULT_LOCAL_KEY;
use crate::core::{Record, RecordChanges, RecordDraft, RecordId, UpdatedRecord};
use crate::discovery::BackendKind;
use crate::error::{Result, StorageError};
use crate::storage::KeyValueStore;

/// Local fallback backend over a [`KeyValueStore`].
pub struct LocalBackend {
    collection: Collection,
    strict_not_found: bool,
}

/// The stored array and where it lives.
#[derive(Clone)]
struct Collection {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl Collection {
    /// Read the stored collection. A missing key is an empty collection.
    fn load(&self) -> Result<Vec<Record>> {
        match self.store.get(&self.key)? {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw).map_err(|e| {
                StorageError::serde(format!(
                    "stored collection under '{}' is unreadable: {}",
                    self.key, e
                ))
            }),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&self, records: &[Record]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.store.set(&self.key, &raw)
    }

    fn remove(&self) -> Result<()> {
        self.store.remove(&self.key)
    }
}

impl LocalBackend {
    /// Create a backend storing its collection under the default key.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            collection: Collection {
                store,
                key: DEFAULT_LOCAL_KEY.to_string(),
            },
            strict_not_found: false,
        }
    }

    /// Use a different storage key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.collection.key = key.into();
        self
    }

    /// Report missing ids on update and delete instead of ignoring them.
    pub fn with_strict_not_found(mut self, strict: bool) -> Self {
        self.strict_not_found = strict;
        self
    }

    pub fn key(&self) -> &str {
        &self.collection.key
    }

    /// Run `work` against the collection on the blocking pool, under `ctx`.
    ///
    /// A call abandoned on timeout or cancel still finishes its work in the
    /// background; only the caller stops waiting.
    async fn with_collection<T, F>(&self, operation: &str, ctx: &CallContext, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Collection) -> Result<T> + Send + 'static,
    {
        let collection = self.collection.clone();
        ctx.run(operation, async move {
            tokio::task::spawn_blocking(move || work(&collection))
                .await
                .map_err(|e| StorageError::from(io::Error::other(e)))?
        })
        .await
    }
}

/// Mint an id from the millisecond clock, bumped past any id already in use.
fn mint_id(records: &[Record]) -> RecordId {
    let mut millis = Utc::now().timestamp_millis();
    loop {
        let candidate = RecordId::Text(millis.to_string());
        if !records.iter().any(|r| r.id.same_as(&candidate)) {
            return candidate;
        }
        millis += 1;
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    async fn create(&self, draft: &RecordDraft, ctx: &CallContext) -> Result<Record> {
        let draft = draft.clone();
        self.with_collection("create", ctx, move |collection| {
            let mut records = collection.load()?;
            let record = Record::new(mint_id(&records), draft, Utc::now());
            records.insert(0, record.clone());
            collection.save(&records)?;
            debug!(id = %record.id, "record stored locally");
            Ok(record)
        })
        .await
    }

    async fn update(&self, changes: &RecordChanges, ctx: &CallContext) -> Result<UpdatedRecord> {
        let changes = changes.clone();
        let strict = self.strict_not_found;
        self.with_collection("update", ctx, move |collection| {
            let mut records = collection.load()?;
            match records.iter_mut().find(|r| r.id.same_as(&changes.id)) {
                Some(record) => {
                    record.fields = changes.fields.clone();
                    let kayit_tarihi = record.kayit_tarihi;
                    collection.save(&records)?;
                    Ok(UpdatedRecord::echo(&changes, Some(kayit_tarihi)))
                }
                None if strict => Err(StorageError::not_found(&changes.id)),
                None => {
                    debug!(id = %changes.id, "update of unknown local id ignored");
                    Ok(UpdatedRecord::echo(&changes, None))
                }
            }
        })
        .await
    }

    async fn delete(&self, id: &RecordId, ctx: &CallContext) -> Result<()> {
        let id = id.clone();
        let strict = self.strict_not_found;
        self.with_collection("delete", ctx, move |collection| {
            let mut records = collection.load()?;
            let before = records.len();
            records.retain(|r| !r.id.same_as(&id));
            if records.len() == before {
                if strict {
                    return Err(StorageError::not_found(&id));
                }
                debug!(%id, "delete of unknown local id ignored");
                return Ok(());
            }
            collection.save(&records)
        })
        .await
    }

    async fn list(&self, ctx: &CallContext) -> Result<Vec<Record>> {
        self.with_collection("list", ctx, |collection| {
            let mut records = collection.load()?;
            // Stable: records sharing a timestamp keep insertion order.
            records.sort_by(|a, b| b.kayit_tarihi.cmp(&a.kayit_tarihi));
            Ok(records)
        })
        .await
    }

    async fn get(&self, id: &RecordId, ctx: &CallContext) -> Result<Option<Record>> {
        let id = id.clone();
        self.with_collection("get", ctx, move |collection| {
            Ok(collection.load()?.into_iter().find(|r| r.id.same_as(&id)))
        })
        .await
    }

    async fn clear_all(&self, ctx: &CallContext) -> Result<usize> {
        self.with_collection("clear", ctx, |collection| {
            let count = collection.load().map(|r| r.len()).unwrap_or(0);
            collection.remove()?;
            Ok(count)
        })
        .await
    }

    fn kind(&self) -> BackendKind {
        BackendKind::LocalStorage
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
