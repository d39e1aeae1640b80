//! Field name translation between the record boundary and the database table.
//!
//! One table drives both directions. Keys missing from the table pass through
//! untouched, so translating an object that is already in the target casing
//! is a no-op.

use serde_json::{Map, Value};

/// (camelCase boundary name, snake_case column name) for every attribute.
pub const FIELD_MAP: &[(&str, &str)] = &[
    ("id", "id"),
    ("durumTipi", "durum_tipi"),
    ("tarih", "tarih"),
    ("baslangicSaati", "baslangic_saati"),
    ("bitisSaati", "bitis_saati"),
    ("vardiya", "vardiya"),
    ("birim", "birim"),
    ("lokasyon", "lokasyon"),
    ("cihazAdi", "cihaz_adi"),
    ("muhendisAdi", "muhendis_adi"),
    ("yapilanIs", "yapilan_is"),
    ("tonaj", "tonaj"),
    ("kayitTarihi", "kayit_tarihi"),
];

/// Column name for a boundary field name.
pub fn column_for(field: &str) -> Option<&'static str> {
    FIELD_MAP
        .iter()
        .find(|(camel, _)| *camel == field)
        .map(|(_, snake)| *snake)
}

/// Boundary field name for a column name.
pub fn field_for(column: &str) -> Option<&'static str> {
    FIELD_MAP
        .iter()
        .find(|(_, snake)| *snake == column)
        .map(|(camel, _)| *camel)
}

/// Rename a row's snake_case columns to boundary field names.
pub fn from_wire(value: Value) -> Value {
    rename_keys(value, field_for)
}

/// Rename boundary field names to snake_case columns.
pub fn to_wire(value: Value) -> Value {
    rename_keys(value, column_for)
}

fn rename_keys(value: Value, lookup: fn(&str) -> Option<&'static str>) -> Value {
    match value {
        Value::Object(map) => {
            let mut renamed = Map::with_capacity(map.len());
            for (key, v) in map {
                let key = lookup(&key).map(str::to_string).unwrap_or(key);
                renamed.insert(key, v);
            }
            Value::Object(renamed)
        }
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| rename_keys(v, lookup)).collect())
        }
        other => other,
    }
}
