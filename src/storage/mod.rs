//! Client-resident key/value storage.
//!
//! This module provides the persistence medium for the local backend,
//! supporting file-based and in-memory stores.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use traits::KeyValueStore;
