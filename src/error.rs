//! Unified error types for the record store.
//!
//! Errors split along one line: reads degrade, writes surface. Read paths
//! (`list`, `get_by_id`, `search`) absorb backend faults through [`FailOpen`]
//! and hand back an empty or absent result. Write paths (`create`, `update`,
//! `delete`, `clear_all`) propagate the error so a lost write is never silent.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The main error type for record store operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Network or connection failure talking to the remote API.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The remote API answered with a non-success status.
    #[error("unexpected response from {operation}: HTTP {status}")]
    MalformedResponse { operation: String, status: u16 },

    /// No record matched the given id.
    #[error("record not found: {id}")]
    NotFound { id: String },

    /// A required field was empty.
    #[error("invalid record: {field} is required")]
    Validation { field: String },

    /// The per-call deadline elapsed before the backend answered.
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    /// The call was cancelled through its cancel token.
    #[error("{operation} was cancelled")]
    Cancelled { operation: String },

    /// A sequential bulk clear stopped short of an empty dataset.
    #[error("clear incomplete: {deleted} deleted, {} failed", .failed.len())]
    PartialClear {
        deleted: usize,
        failed: Vec<String>,
    },

    /// JSON (de)serialization failure.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// I/O failure in the local key/value store.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for record store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// Create an error for a non-success HTTP status.
    pub fn malformed_response(operation: impl Into<String>, status: u16) -> Self {
        Self::MalformedResponse {
            operation: operation.into(),
            status,
        }
    }

    /// Create a not found error.
    pub fn not_found(id: impl ToString) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// Create a validation error for a missing field.
    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after,
        }
    }

    /// Create a cancellation error.
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error is a "no such record" signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Serde {
                message: err.to_string(),
            };
        }
        if let Some(status) = err.status() {
            return Self::MalformedResponse {
                operation: err
                    .url()
                    .map(|u| u.path().to_string())
                    .unwrap_or_default(),
                status: status.as_u16(),
            };
        }
        Self::Transport {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling on read paths.
///
/// Logs the error and returns a safe default instead of propagating it.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }
}

/// Exit codes for the `ariza` CLI.
pub mod exit_codes {
    /// The command completed.
    pub const SUCCESS: i32 = 0;

    /// The command failed (write rejected, backend fault, bad input).
    pub const FAILURE: i32 = 1;

    /// The targeted record does not exist.
    pub const NOT_FOUND: i32 = 4;
}
