//! Storage backends.
//!
//! This module provides the trait interface and the two implementations a
//! record store can run on.
//!
//! Available backends:
//! - **Database**: HTTP client for the record database API
//! - **Local**: JSON collection in a client-resident key/value store

pub mod call;
pub mod local;
pub mod remote;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock_api;

pub use call::{CallContext, CancelHandle, CancelToken};
pub use local::LocalBackend;
pub use remote::RemoteBackend;
pub use traits::StorageBackend;
