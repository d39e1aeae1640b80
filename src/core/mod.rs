//! Core types for the record store.
//!
//! This module contains the record entity, the search query, and the field
//! name table shared by every backend.

pub mod fields;
pub mod query;
pub mod record;

pub use query::SearchQuery;
pub use record::{Record, RecordChanges, RecordDraft, RecordId, UpdatedRecord};
