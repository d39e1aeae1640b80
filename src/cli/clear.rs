//! Clear command.
//!
//! Removes every record from the active backend.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::store::RecordStore;

/// Options for the clear command.
#[derive(Debug, Clone, Default)]
pub struct ClearOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Confirm the destructive operation.
    pub yes: bool,
}

/// Output format for the clear command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Number of records removed.
    pub removed: usize,
    /// Ids left behind by a partial clear.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClearOutput {
    /// Create a successful output.
    pub fn success(removed: usize) -> Self {
        Self {
            success: true,
            removed,
            failed: Vec::new(),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(err: StorageError) -> Self {
        let message = err.to_string();
        match err {
            StorageError::PartialClear { deleted, failed } => Self {
                success: false,
                removed: deleted,
                failed,
                error: Some(message),
            },
            _ => Self {
                success: false,
                removed: 0,
                failed: Vec::new(),
                error: Some(message),
            },
        }
    }
}

/// The clear command implementation.
pub struct ClearCommand<'a> {
    store: &'a RecordStore,
}

impl<'a> ClearCommand<'a> {
    /// Create a new clear command.
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// Run the clear command. Refuses to run without `yes`.
    pub async fn run(&self, options: &ClearOptions) -> ClearOutput {
        if !options.yes {
            return ClearOutput {
                success: false,
                removed: 0,
                failed: Vec::new(),
                error: Some("refusing to clear without --yes".to_string()),
            };
        }

        match self.store.clear_all().await {
            Ok(removed) => ClearOutput::success(removed),
            Err(e) => ClearOutput::failure(e),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ClearOutput, options: &ClearOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if output.success {
            return format!("Removed {} record(s).\n", output.removed);
        }

        let mut text = format!(
            "Clear failed: {}\n",
            output.error.as_deref().unwrap_or("unknown error")
        );
        if !output.failed.is_empty() {
            text.push_str(&format!("Still present: {}\n", output.failed.join(", ")));
        }
        text
    }
}
