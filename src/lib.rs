//! ariza - fault and downtime record store
//!
//! Stores fault/downtime records through one facade, [`RecordStore`], backed
//! by either the record database API or a local key/value fallback. The
//! backend is chosen once, at initialization, by probing the API.

pub mod backends;
pub mod cli;
pub mod config;
pub mod core;
pub mod discovery;
pub mod error;
pub mod storage;
pub mod store;
pub mod util;

pub use backends::{
    CallContext, CancelHandle, CancelToken, LocalBackend, RemoteBackend, StorageBackend,
};
pub use config::Config;
pub use core::{Record, RecordChanges, RecordDraft, RecordId, SearchQuery, UpdatedRecord};
pub use discovery::{select_backend, BackendKind};
pub use error::{Result, StorageError};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use store::{BackendStatus, RecordStore};

// CLI commands
pub use cli::{
    AddCommand, ClearCommand, DeleteCommand, GetCommand, ListCommand, SearchCommand,
    StatusCommand, UpdateCommand,
};
