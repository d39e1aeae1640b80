//! Key/value storage traits.
//!
//! This module defines the `KeyValueStore` trait: the client-resident medium
//! the local backend persists its serialized record collection into.

use std::sync::Arc;

use crate::error::Result;

/// Trait for client-resident key/value storage.
///
/// Values are opaque strings. Implementations must be safe to share across
/// threads, but they do not coordinate read-modify-write cycles: two writers
/// racing on one key resolve as last writer wins.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key has never been written or was removed.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`.
    ///
    /// Returns `Ok(())` even if the key doesn't exist.
    fn remove(&self, key: &str) -> Result<()>;

    /// Human-readable location for logging.
    fn describe(&self) -> String;
}

/// Blanket implementation of KeyValueStore for Arc-wrapped stores.
///
/// This allows tests to keep a handle on a store while a backend owns it.
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
