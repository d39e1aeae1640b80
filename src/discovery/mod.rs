//! Discovery module.
//!
//! Decides, once per store, whether records go to the database API or to
//! the local key/value fallback.

pub mod backends;

pub use backends::{
    default_key_value_store, local_backend, probe_remote, select_backend, BackendKind,
};
