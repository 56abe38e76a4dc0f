//! Reads lead rows out of a comma-separated payload.
//!
//! The first line is a header and is skipped. Every following record is read
//! by position as `name, email, phone`; extra columns are ignored and missing
//! ones are treated as absent. Quoted fields follow the usual CSV rules, so
//! `"Doe, John"` stays one field and `""` inside quotes is a literal quote.

use crate::model::lead::ExternalLeadRow;
use ::csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};

const NAME_COLUMN: usize = 0;
const EMAIL_COLUMN: usize = 1;
const PHONE_COLUMN: usize = 2;

fn cell(record: &StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(|value| value.replace('\u{00A0}', " ").trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses `payload` into external rows tagged with `source_label`.
///
/// Rows with a blank name are dropped. Records the reader cannot decode are
/// skipped with a warning rather than failing the whole payload.
pub fn parse_lead_rows(payload: &str, source_label: &str) -> Vec<ExternalLeadRow> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(payload.as_bytes());

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable row {} from {}: {}", index + 2, source_label, e);
                continue;
            }
        };

        let Some(name) = cell(&record, NAME_COLUMN) else {
            debug!("Dropping row {} from {}: blank name", index + 2, source_label);
            continue;
        };

        rows.push(ExternalLeadRow {
            email: cell(&record, EMAIL_COLUMN),
            phone: cell(&record, PHONE_COLUMN),
            ..ExternalLeadRow::new(name, source_label)
        });
    }
    rows
}
