//! Storage backend trait.
//!
//! This module defines the operation set both backends implement: the
//! database API client and the local key/value fallback. Callers never pick
//! one directly; [`crate::store::RecordStore`] owns whichever was selected.

use async_trait::async_trait;

use crate::backends::call::CallContext;
use crate::core::{Record, RecordChanges, RecordDraft, RecordId, SearchQuery, UpdatedRecord};
use crate::discovery::BackendKind;
use crate::error::Result;

/// Trait for record storage backends.
///
/// Every I/O method takes a [`CallContext`] and must route its awaits through
/// [`CallContext::run`] so deadlines and cancellation apply uniformly.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store a new record. The backend assigns `id` and `kayitTarihi`.
    async fn create(&self, draft: &RecordDraft, ctx: &CallContext) -> Result<Record>;

    /// Replace the editable fields of an existing record.
    ///
    /// Returns what the backend echoes back, which may omit fields its
    /// update path does not persist.
    async fn update(&self, changes: &RecordChanges, ctx: &CallContext) -> Result<UpdatedRecord>;

    /// Remove a record.
    async fn delete(&self, id: &RecordId, ctx: &CallContext) -> Result<()>;

    /// All records, newest `kayitTarihi` first.
    async fn list(&self, ctx: &CallContext) -> Result<Vec<Record>>;

    /// One record by id. `Ok(None)` when absent.
    async fn get(&self, id: &RecordId, ctx: &CallContext) -> Result<Option<Record>>;

    /// Records matching the query, in list order.
    ///
    /// Default implementation filters the full list.
    async fn search(&self, query: &SearchQuery, ctx: &CallContext) -> Result<Vec<Record>> {
        let records = self.list(ctx).await?;
        Ok(records.into_iter().filter(|r| query.matches(r)).collect())
    }

    /// Remove every record, returning how many were removed.
    async fn clear_all(&self, ctx: &CallContext) -> Result<usize>;

    /// Which kind of backend this is.
    fn kind(&self) -> BackendKind;

    /// Get the backend name for logging.
    fn name(&self) -> &'static str;
}
