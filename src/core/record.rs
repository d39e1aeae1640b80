//! Record entity types.
//!
//! A record is one fault or downtime entry: when it happened, which shift,
//! unit, location and device, who handled it, what was done and how much
//! tonnage was lost. Field names at this boundary are camelCase; the remote
//! table uses snake_case columns (see [`super::fields`]).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};

/// Backend-assigned record identifier.
///
/// The database hands out auto-incrementing integers. The local store mints
/// millisecond clock readings as strings. The two id spaces never meet in one
/// process because exactly one backend is active.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Parse a user-supplied id, preferring the integer form.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Text(trimmed.to_string()),
        }
    }

    /// Whether two ids name the same record.
    ///
    /// Compares textual forms: the remote update response echoes the path
    /// parameter as a string, so `Int(5)` and `Text("5")` are the same record.
    pub fn same_as(&self, other: &RecordId) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// The caller-editable fields of a record.
///
/// This is the create payload, and the body of an update alongside the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDraft {
    /// Kind of event (fault, planned stop, ...).
    pub durum_tipi: String,
    /// Event date.
    pub tarih: String,
    /// Start time.
    pub baslangic_saati: String,
    /// End time.
    pub bitis_saati: String,
    /// Shift.
    pub vardiya: String,
    /// Unit.
    pub birim: String,
    /// Location.
    pub lokasyon: String,
    /// Device name.
    pub cihaz_adi: String,
    /// Engineer name.
    pub muhendis_adi: String,
    /// Work performed.
    pub yapilan_is: String,
    /// Tonnage impact.
    pub tonaj: i64,
}

impl RecordDraft {
    /// Check that every required text field is present.
    ///
    /// Reports the first empty field by its camelCase name.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("durumTipi", &self.durum_tipi),
            ("tarih", &self.tarih),
            ("baslangicSaati", &self.baslangic_saati),
            ("bitisSaati", &self.bitis_saati),
            ("vardiya", &self.vardiya),
            ("birim", &self.birim),
            ("lokasyon", &self.lokasyon),
            ("cihazAdi", &self.cihaz_adi),
            ("muhendisAdi", &self.muhendis_adi),
            ("yapilanIs", &self.yapilan_is),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(StorageError::validation(name));
            }
        }

        Ok(())
    }
}

/// A stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Assigned by the backend on create.
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: RecordDraft,
    /// Assigned by the backend on create.
    pub kayit_tarihi: DateTime<Utc>,
}

impl Record {
    /// Build a record from a draft with backend-assigned id and timestamp.
    pub fn new(id: RecordId, fields: RecordDraft, kayit_tarihi: DateTime<Utc>) -> Self {
        Self {
            id,
            fields,
            kayit_tarihi,
        }
    }

    /// The update request that would leave this record unchanged.
    pub fn to_changes(&self) -> RecordChanges {
        RecordChanges {
            id: self.id.clone(),
            fields: self.fields.clone(),
        }
    }
}

/// An update request: the target id plus the replacement fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordChanges {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: RecordDraft,
}

impl RecordChanges {
    pub fn new(id: impl Into<RecordId>, fields: RecordDraft) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// A record as echoed back by an update.
///
/// The database update path neither persists nor returns `tonaj` or
/// `kayitTarihi`, so both are optional here. The local store echoes the
/// submitted fields and keeps the original timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedRecord {
    pub id: RecordId,
    pub durum_tipi: String,
    pub tarih: String,
    pub baslangic_saati: String,
    pub bitis_saati: String,
    pub vardiya: String,
    pub birim: String,
    pub lokasyon: String,
    pub cihaz_adi: String,
    pub muhendis_adi: String,
    pub yapilan_is: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tonaj: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kayit_tarihi: Option<DateTime<Utc>>,
}

impl UpdatedRecord {
    /// Echo a full change set back, as the local store does.
    pub fn echo(changes: &RecordChanges, kayit_tarihi: Option<DateTime<Utc>>) -> Self {
        let f = &changes.fields;
        Self {
            id: changes.id.clone(),
            durum_tipi: f.durum_tipi.clone(),
            tarih: f.tarih.clone(),
            baslangic_saati: f.baslangic_saati.clone(),
            bitis_saati: f.bitis_saati.clone(),
            vardiya: f.vardiya.clone(),
            birim: f.birim.clone(),
            lokasyon: f.lokasyon.clone(),
            cihaz_adi: f.cihaz_adi.clone(),
            muhendis_adi: f.muhendis_adi.clone(),
            yapilan_is: f.yapilan_is.clone(),
            tonaj: Some(f.tonaj),
            kayit_tarihi,
        }
    }
}
