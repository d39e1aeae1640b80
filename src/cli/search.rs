//! Search command.
//!
//! Filters records by free text, event kind and shift.

use serde::{Deserialize, Serialize};

use crate::cli::format_records;
use crate::core::{Record, SearchQuery};
use crate::store::RecordStore;

/// Options for the search command.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

/// Output format for the search command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutput {
    /// Whether the search was successful.
    pub success: bool,
    /// The query used.
    pub query: SearchQuery,
    /// Number of results shown.
    pub count: usize,
    /// The matching records, newest first.
    pub records: Vec<Record>,
}

/// The search command implementation.
pub struct SearchCommand<'a> {
    store: &'a RecordStore,
}

impl<'a> SearchCommand<'a> {
    /// Create a new search command.
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// Run the search command.
    pub async fn run(&self, query: &SearchQuery, options: &SearchOptions) -> SearchOutput {
        let mut records = self.store.search(query).await;
        if let Some(limit) = options.limit {
            records.truncate(limit);
        }
        SearchOutput {
            success: true,
            query: query.clone(),
            count: records.len(),
            records,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &SearchOutput, options: &SearchOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            format_records(&output.records, "No matching records.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::LocalBackend;
    use crate::config::Config;
    use crate::core::record::fixtures::draft;
    use crate::storage::MemoryKeyValueStore;
    use std::sync::Arc;

    async fn seeded_store() -> RecordStore {
        let backend = LocalBackend::new(Arc::new(MemoryKeyValueStore::new()));
        let store = RecordStore::new(Box::new(backend), &Config::default());
        store.create(&draft()).await.unwrap();
        let mut stop = draft();
        stop.durum_tipi = "Duruş".to_string();
        stop.lokasyon = "Kazan Dairesi".to_string();
        stop.cihaz_adi = "Kazan".to_string();
        store.create(&stop).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_search_by_term() {
        let store = seeded_store().await;
        let cmd = SearchCommand::new(&store);
        let options = SearchOptions::default();

        let output = cmd.run(&SearchQuery::new().term("kazan"), &options).await;
        assert_eq!(output.count, 1);
        assert_eq!(output.records[0].fields.durum_tipi, "Duruş");
    }

    #[tokio::test]
    async fn test_search_by_durum() {
        let store = seeded_store().await;
        let cmd = SearchCommand::new(&store);

        let output = cmd
            .run(&SearchQuery::new().durum("Arıza"), &SearchOptions::default())
            .await;
        assert_eq!(output.count, 1);
        assert_eq!(output.records[0].fields.lokasyon, "Pompa Odası");
    }

    #[tokio::test]
    async fn test_search_no_match() {
        let store = seeded_store().await;
        let cmd = SearchCommand::new(&store);
        let options = SearchOptions::default();

        let output = cmd.run(&SearchQuery::new().vardiya("Gece"), &options).await;
        assert_eq!(output.count, 0);
        assert_eq!(cmd.format_output(&output, &options), "No matching records.\n");
    }

    #[tokio::test]
    async fn test_search_json_echoes_query() {
        let store = seeded_store().await;
        let cmd = SearchCommand::new(&store);
        let options = SearchOptions {
            json: true,
            limit: Some(1),
            ..Default::default()
        };

        let output = cmd.run(&SearchQuery::new().term("a"), &options).await;
        assert_eq!(output.count, 1);
        let parsed: serde_json::Value =
            serde_json::from_str(&cmd.format_output(&output, &options)).unwrap();
        assert_eq!(parsed["query"]["searchTerm"], "a");
    }
}
