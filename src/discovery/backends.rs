//! Backend selection.
//!
//! Runs once at initialization: probe the database API, and keep it if the
//! probe succeeds within its deadline. Otherwise fall back to the local
//! key/value store. The choice is fixed for the life of the store; a database
//! that comes up later is not picked up.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::backends::{CallContext, LocalBackend, RemoteBackend, StorageBackend};
use crate::config::Config;
use crate::error::Result;
use crate::storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

/// Which backend a store is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// The database API.
    Database,
    /// The local key/value fallback.
    LocalStorage,
}

impl BackendKind {
    /// Get the backend kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "Database",
            Self::LocalStorage => "LocalStorage",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build the key/value store the local backend persists into.
///
/// In-memory when configured so, or when no storage directory can be
/// resolved; a file store under the configured directory otherwise.
pub fn default_key_value_store(config: &Config) -> Arc<dyn KeyValueStore> {
    if config.local.memory {
        return Arc::new(MemoryKeyValueStore::new());
    }
    match config.local_dir() {
        Some(dir) => Arc::new(FileKeyValueStore::with_dir(dir)),
        None => {
            warn!("no local storage directory available, records will not persist");
            Arc::new(MemoryKeyValueStore::new())
        }
    }
}

/// Build the local backend from configuration.
pub fn local_backend(config: &Config, store: Arc<dyn KeyValueStore>) -> LocalBackend {
    LocalBackend::new(store)
        .with_key(config.local.key.clone())
        .with_strict_not_found(config.local.strict_not_found)
}

/// Probe the configured database API.
///
/// Succeeds only on a 2xx status response with a JSON body, received within
/// the probe deadline.
pub async fn probe_remote(config: &Config) -> Result<RemoteBackend> {
    let backend = RemoteBackend::new(config.api.base_url.clone())?;
    let ctx = CallContext::new(config.api.probe_timeout());
    backend.probe(&ctx).await?;
    Ok(backend)
}

/// Choose the backend for a new store.
///
/// # Arguments
///
/// * `config` - API location, probe deadline and local settings.
/// * `store` - Medium for the local backend if the probe fails.
pub async fn select_backend(
    config: &Config,
    store: Arc<dyn KeyValueStore>,
) -> Box<dyn StorageBackend> {
    if config.api.force_local {
        info!(
            location = %store.describe(),
            "database probe skipped, using local storage"
        );
        return Box::new(local_backend(config, store));
    }

    match probe_remote(config).await {
        Ok(remote) => {
            info!(url = remote.base_url(), "database API reachable");
            Box::new(remote)
        }
        Err(err) => {
            warn!(
                url = %config.api.base_url,
                location = %store.describe(),
                "database API unavailable ({}), falling back to local storage",
                err
            );
            Box::new(local_backend(config, store))
        }
    }
}
