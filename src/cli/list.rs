//! List command.
//!
//! Shows every record, newest first.

use serde::{Deserialize, Serialize};

use crate::cli::format_records;
use crate::core::Record;
use crate::store::RecordStore;

/// Options for the list command.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Maximum number of records to show.
    pub limit: Option<usize>,
}

/// Output format for the list command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Number of records shown.
    pub count: usize,
    /// Total number of records before the limit was applied.
    pub total: usize,
    /// The records, newest first.
    pub records: Vec<Record>,
}

impl ListOutput {
    /// Create a successful output, truncated to `limit`.
    pub fn new(mut records: Vec<Record>, limit: Option<usize>) -> Self {
        let total = records.len();
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Self {
            success: true,
            count: records.len(),
            total,
            records,
        }
    }
}

/// The list command implementation.
pub struct ListCommand<'a> {
    store: &'a RecordStore,
}

impl<'a> ListCommand<'a> {
    /// Create a new list command.
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// Run the list command.
    ///
    /// A backend fault shows up as an empty list; the store has already
    /// logged it.
    pub async fn run(&self, options: &ListOptions) -> ListOutput {
        ListOutput::new(self.store.list().await, options.limit)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ListOutput, options: &ListOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            let mut text = format_records(&output.records, "No records.");
            if output.count < output.total {
                text.push_str(&format!("({} more not shown)\n", output.total - output.count));
            }
            text
        }
    }
}
