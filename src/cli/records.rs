//! Single-record commands: add, get, update, delete.

use serde::{Deserialize, Serialize};

use crate::cli::format_record;
use crate::core::{Record, RecordChanges, RecordDraft, RecordId, UpdatedRecord};
use crate::error::StorageError;
use crate::store::RecordStore;

/// Options shared by the single-record commands.
#[derive(Debug, Clone, Default)]
pub struct RecordOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the single-record commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// The stored record (add, get).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<Record>,
    /// What the backend echoed back (update).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<UpdatedRecord>,
    /// Id the command targeted (get, update, delete).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The target record does not exist.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub not_found: bool,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordOutput {
    fn empty(success: bool) -> Self {
        Self {
            success,
            record: None,
            updated: None,
            id: None,
            not_found: false,
            error: None,
        }
    }

    /// A record was stored or found.
    pub fn with_record(record: Record) -> Self {
        Self {
            id: Some(record.id.to_string()),
            record: Some(record),
            ..Self::empty(true)
        }
    }

    /// An update went through.
    pub fn with_update(updated: UpdatedRecord) -> Self {
        Self {
            id: Some(updated.id.to_string()),
            updated: Some(updated),
            ..Self::empty(true)
        }
    }

    /// A delete went through.
    pub fn deleted(id: &RecordId) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::empty(true)
        }
    }

    /// Create a failed output.
    pub fn failure(id: Option<&RecordId>, err: &StorageError) -> Self {
        Self {
            id: id.map(|id| id.to_string()),
            not_found: err.is_not_found(),
            error: Some(err.to_string()),
            ..Self::empty(false)
        }
    }

    /// No record with this id.
    pub fn missing(id: &RecordId) -> Self {
        Self::failure(Some(id), &StorageError::not_found(id))
    }
}

fn format_output(output: &RecordOutput, options: &RecordOptions, done: &str) -> String {
    if options.quiet {
        return String::new();
    }
    if options.json {
        return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
    }
    if !output.success {
        return format!(
            "Error: {}\n",
            output.error.as_deref().unwrap_or("unknown error")
        );
    }
    if let Some(record) = &output.record {
        return format!("{}\n{}\n", done, format_record(record));
    }
    match &output.id {
        Some(id) => format!("{} (id {})\n", done, id),
        None => format!("{}\n", done),
    }
}

/// Replacement values for an update. Unset fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub durum_tipi: Option<String>,
    pub tarih: Option<String>,
    pub baslangic_saati: Option<String>,
    pub bitis_saati: Option<String>,
    pub vardiya: Option<String>,
    pub birim: Option<String>,
    pub lokasyon: Option<String>,
    pub cihaz_adi: Option<String>,
    pub muhendis_adi: Option<String>,
    pub yapilan_is: Option<String>,
    pub tonaj: Option<i64>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay the set fields onto `base`.
    pub fn apply(&self, mut base: RecordDraft) -> RecordDraft {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(value) = value {
                target.clone_from(value);
            }
        }
        set(&mut base.durum_tipi, &self.durum_tipi);
        set(&mut base.tarih, &self.tarih);
        set(&mut base.baslangic_saati, &self.baslangic_saati);
        set(&mut base.bitis_saati, &self.bitis_saati);
        set(&mut base.vardiya, &self.vardiya);
        set(&mut base.birim, &self.birim);
        set(&mut base.lokasyon, &self.lokasyon);
        set(&mut base.cihaz_adi, &self.cihaz_adi);
        set(&mut base.muhendis_adi, &self.muhendis_adi);
        set(&mut base.yapilan_is, &self.yapilan_is);
        if let Some(tonaj) = self.tonaj {
            base.tonaj = tonaj;
        }
        base
    }
}

/// The add command implementation.
pub struct AddCommand<'a> {
    store: &'a RecordStore,
}

impl<'a> AddCommand<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// Store a new record.
    pub async fn run(&self, draft: &RecordDraft, _options: &RecordOptions) -> RecordOutput {
        match self.store.create(draft).await {
            Ok(record) => RecordOutput::with_record(record),
            Err(e) => RecordOutput::failure(None, &e),
        }
    }

    pub fn format_output(&self, output: &RecordOutput, options: &RecordOptions) -> String {
        format_output(output, options, "Record added.")
    }
}

/// The get command implementation.
pub struct GetCommand<'a> {
    store: &'a RecordStore,
}

impl<'a> GetCommand<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// Look up one record.
    pub async fn run(&self, id: &RecordId, _options: &RecordOptions) -> RecordOutput {
        match self.store.get_by_id(id).await {
            Some(record) => RecordOutput::with_record(record),
            None => RecordOutput::missing(id),
        }
    }

    pub fn format_output(&self, output: &RecordOutput, options: &RecordOptions) -> String {
        format_output(output, options, "Record:")
    }
}

/// The update command implementation.
///
/// Updates replace every editable field, so the current values are read
/// first and the patch is laid over them.
pub struct UpdateCommand<'a> {
    store: &'a RecordStore,
}

impl<'a> UpdateCommand<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    pub async fn run(
        &self,
        id: &RecordId,
        patch: &RecordPatch,
        _options: &RecordOptions,
    ) -> RecordOutput {
        let Some(current) = self.store.get_by_id(id).await else {
            return RecordOutput::missing(id);
        };

        let changes = RecordChanges::new(current.id.clone(), patch.apply(current.fields));
        match self.store.update(&changes).await {
            Ok(updated) => RecordOutput::with_update(updated),
            Err(e) => RecordOutput::failure(Some(id), &e),
        }
    }

    pub fn format_output(&self, output: &RecordOutput, options: &RecordOptions) -> String {
        format_output(output, options, "Record updated.")
    }
}

/// The delete command implementation.
pub struct DeleteCommand<'a> {
    store: &'a RecordStore,
}

impl<'a> DeleteCommand<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    pub async fn run(&self, id: &RecordId, _options: &RecordOptions) -> RecordOutput {
        match self.store.delete(id).await {
            Ok(()) => RecordOutput::deleted(id),
            Err(e) => RecordOutput::failure(Some(id), &e),
        }
    }

    pub fn format_output(&self, output: &RecordOutput, options: &RecordOptions) -> String {
        format_output(output, options, "Record deleted.")
    }
}
