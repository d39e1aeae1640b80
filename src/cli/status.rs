//! Status command.
//!
//! Shows which backend the store selected at startup.

use serde::{Deserialize, Serialize};

use crate::store::{BackendStatus, RecordStore};

/// Options for the status command.
#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the status command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusOutput {
    /// Whether the command was successful.
    pub success: bool,
    #[serde(flatten)]
    pub status: BackendStatus,
}

/// The status command implementation.
pub struct StatusCommand<'a> {
    store: &'a RecordStore,
}

impl<'a> StatusCommand<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// Run the status command. Performs no I/O.
    pub fn run(&self, _options: &StatusOptions) -> StatusOutput {
        StatusOutput {
            success: true,
            status: self.store.status(),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StatusOutput, options: &StatusOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        let connection = if output.status.is_connected {
            "connected"
        } else {
            "offline, using local fallback"
        };
        format!(
            "Backend: {}\nDatabase: {} ({})\n",
            output.status.backend_type, output.status.name, connection
        )
    }
}
