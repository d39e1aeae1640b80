//! CLI commands for ariza.
//!
//! This module provides the command implementations behind the `ariza`
//! binary, organized into:
//! - **Record commands**: add, get, update, delete
//! - **Query commands**: list, search
//! - **Utility commands**: status, clear

// Record commands
pub mod records;

// Query commands
pub mod list;
pub mod search;

// Utility commands
pub mod clear;
pub mod status;

pub use clear::ClearCommand;
pub use list::ListCommand;
pub use records::{AddCommand, DeleteCommand, GetCommand, RecordPatch, UpdateCommand};
pub use search::SearchCommand;
pub use status::StatusCommand;

use crate::core::Record;

/// One-line summary of a record followed by the work description.
pub(crate) fn format_record(record: &Record) -> String {
    let f = &record.fields;
    format!(
        "[{}] {} {}-{} {} / {} / {} / {} @ {}, {}: {} t\n    {} ({})",
        record.id,
        f.tarih,
        f.baslangic_saati,
        f.bitis_saati,
        f.durum_tipi,
        f.vardiya,
        f.birim,
        f.cihaz_adi,
        f.lokasyon,
        f.muhendis_adi,
        f.tonaj,
        f.yapilan_is,
        record.kayit_tarihi.format("%Y-%m-%d %H:%M"),
    )
}

/// A list of records, or a placeholder line when there are none.
pub(crate) fn format_records(records: &[Record], empty: &str) -> String {
    if records.is_empty() {
        return format!("{}\n", empty);
    }
    let mut lines: Vec<String> = records.iter().map(format_record).collect();
    lines.push(format!("\n{} record(s)", records.len()));
    lines.join("\n") + "\n"
}
