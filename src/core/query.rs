//! Search query for records.
//!
//! A free-text term matched case-insensitively against four text fields,
//! ANDed with exact filters on status and shift. Absent or empty parts impose
//! no constraint; whitespace is matched like any other text.

use serde::{Deserialize, Serialize};

use super::record::Record;

/// Query parameters for searching records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Substring matched against work performed, location, device and engineer.
    pub search_term: Option<String>,
    /// Exact match on `durumTipi`.
    pub filter_durum: Option<String>,
    /// Exact match on `vardiya`.
    pub filter_vardiya: Option<String>,
}

impl SearchQuery {
    /// Create a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-text term.
    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    /// Set the status filter.
    pub fn durum(mut self, durum: impl Into<String>) -> Self {
        self.filter_durum = Some(durum.into());
        self
    }

    /// Set the shift filter.
    pub fn vardiya(mut self, vardiya: impl Into<String>) -> Self {
        self.filter_vardiya = Some(vardiya.into());
        self
    }

    /// The term, if present and not empty.
    pub fn active_term(&self) -> Option<&str> {
        non_empty(&self.search_term)
    }

    /// The status filter, if present and not empty.
    pub fn active_durum(&self) -> Option<&str> {
        non_empty(&self.filter_durum)
    }

    /// The shift filter, if present and not empty.
    pub fn active_vardiya(&self) -> Option<&str> {
        non_empty(&self.filter_vardiya)
    }

    /// Check if the query has no active criteria.
    pub fn is_empty(&self) -> bool {
        self.active_term().is_none()
            && self.active_durum().is_none()
            && self.active_vardiya().is_none()
    }

    /// Check if a record satisfies every active criterion.
    pub fn matches(&self, record: &Record) -> bool {
        let f = &record.fields;

        if let Some(term) = self.active_term() {
            let needle = term.to_lowercase();
            let hit = [&f.yapilan_is, &f.lokasyon, &f.cihaz_adi, &f.muhendis_adi]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if let Some(durum) = self.active_durum() {
            if f.durum_tipi != durum {
                return false;
            }
        }

        if let Some(vardiya) = self.active_vardiya() {
            if f.vardiya != vardiya {
                return false;
            }
        }

        true
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::fixtures::draft;
    use crate::core::record::{Record, RecordId};
    use chrono::Utc;
    use proptest::prelude::*;

    fn record_with(durum: &str, vardiya: &str, lokasyon: &str) -> Record {
        let mut fields = draft();
        fields.durum_tipi = durum.to_string();
        fields.vardiya = vardiya.to_string();
        fields.lokasyon = lokasyon.to_string();
        Record::new(RecordId::Int(1), fields, Utc::now())
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let query = SearchQuery::new();
        assert!(query.is_empty());
        assert!(query.matches(&record_with("Arıza", "Gece", "Depo")));
    }

    #[test]
    fn test_empty_values_count_as_absent() {
        let query = SearchQuery::new().term("").durum("").vardiya("");
        assert!(query.is_empty());
        assert!(query.matches(&record_with("Duruş", "Gündüz", "Depo")));
    }

    #[test]
    fn test_whitespace_term_matches_literally() {
        let query = SearchQuery::new().term(" ");
        assert!(!query.is_empty());
        assert!(query.matches(&record_with("Arıza", "Gündüz", "Pompa Odası")));

        let mut fields = draft();
        fields.lokasyon = "Depo".to_string();
        fields.cihaz_adi = "P-101".to_string();
        fields.muhendis_adi = "Ayşe".to_string();
        fields.yapilan_is = "Temizlik".to_string();
        let no_spaces = Record::new(RecordId::Int(2), fields, Utc::now());
        assert!(!query.matches(&no_spaces));
    }

    #[test]
    fn test_term_is_case_insensitive() {
        let record = record_with("Arıza", "Gündüz", "Pompa Odası");
        assert!(SearchQuery::new().term("pompa").matches(&record));
        assert!(SearchQuery::new().term("POMPA ODA").matches(&record));
        assert!(!SearchQuery::new().term("kazan").matches(&record));
    }

    #[test]
    fn test_term_searches_all_four_fields() {
        let record = record_with("Arıza", "Gündüz", "Depo");
        assert!(SearchQuery::new().term("salmastra").matches(&record));
        assert!(SearchQuery::new().term("p-101").matches(&record));
        assert!(SearchQuery::new().term("ayşe").matches(&record));
        // birim is not a search field
        assert!(!SearchQuery::new().term("mekanik").matches(&record));
    }

    #[test]
    fn test_filters_are_exact() {
        let record = record_with("Arıza", "Gece", "Depo");
        assert!(SearchQuery::new().durum("Arıza").matches(&record));
        assert!(!SearchQuery::new().durum("arıza").matches(&record));
        assert!(!SearchQuery::new().vardiya("Gec").matches(&record));
    }

    #[test]
    fn test_criteria_are_anded() {
        let record = record_with("Arıza", "Gece", "Pompa Odası");
        assert!(SearchQuery::new()
            .term("pompa")
            .durum("Arıza")
            .vardiya("Gece")
            .matches(&record));
        assert!(!SearchQuery::new()
            .term("pompa")
            .durum("Arıza")
            .vardiya("Gündüz")
            .matches(&record));
    }

    proptest! {
        #[test]
        fn prop_status_filter_selects_exact_subset(
            statuses in proptest::collection::vec(
                prop_oneof![Just("Arıza"), Just("Duruş"), Just("Bakım")], 0..20),
            wanted in prop_oneof![Just("Arıza"), Just("Duruş"), Just("Bakım")],
        ) {
            let records: Vec<Record> = statuses
                .iter()
                .map(|s| record_with(s, "Gündüz", "Depo"))
                .collect();
            let query = SearchQuery::new().durum(wanted);
            let hits = records.iter().filter(|r| query.matches(r)).count();
            let expected = statuses.iter().filter(|s| **s == wanted).count();
            prop_assert_eq!(hits, expected);
        }
    }
}
