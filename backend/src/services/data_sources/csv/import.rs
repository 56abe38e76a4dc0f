//! # CSV Import Worker
//!
//! Runs on the blocking pool for every accepted upload:
//!
//! 1. Parses the file into external rows labelled `CSV: <filename>`.
//! 2. Loads the stored leads and drops every row that matches one of them by
//!    email or phone. Rows imported earlier in the same file count as stored,
//!    so a file listing the same person twice imports them once.
//! 3. Inserts the remaining rows in one transaction, unassigned.
//! 4. Stores the lead count against the file's MD5, claimed at upload time so
//!    re-uploading it is a no-op.

use crate::error::Result;
use crate::job_controller::state::JobUpdate;
use crate::services::data_sources::csv::upload::UploadedCsv;
use crate::store::LeadStore;
use chrono::Utc;
use common::import::csv::parse_lead_rows;
use common::jobs::JobStatus;
use common::leads::{find_match, import_at};
use common::model::lead::{source, ExternalLeadRow, LeadRecord};
use common::model::persist::PersistOperation;
use log::{debug, info};
use std::time::Instant;
use tokio::sync::mpsc;

/// Picks the rows of a file that are not stored yet.
pub fn new_records(persisted: Vec<LeadRecord>, rows: &[ExternalLeadRow]) -> Vec<LeadRecord> {
    let now = Utc::now();
    let mut known = persisted;
    let already_stored = known.len();

    for row in rows {
        if find_match(&known, row).is_some() {
            continue;
        }
        if let PersistOperation::Create { record } = import_at(row, now) {
            known.push(record);
        }
    }
    known.split_off(already_stored)
}

/// Imports one uploaded file and returns how many leads were created.
pub fn import_blocking(
    tx: &mpsc::Sender<JobUpdate>,
    job_id: &str,
    store: &LeadStore,
    upload: &UploadedCsv,
) -> Result<usize> {
    let start = Instant::now();
    let rows = parse_lead_rows(&upload.text, &source::csv_file(&upload.filename));
    let _ = tx.blocking_send(JobUpdate {
        job_id: job_id.to_string(),
        status: JobStatus::InProgress(rows.len() as u32),
    });
    debug!("{}: {} rows parsed", upload.filename, rows.len());

    let records = new_records(store.list()?, &rows);
    store.insert_all(&records)?;
    store.record_import(&upload.md5, &upload.filename, records.len())?;

    info!(
        "Imported {} of {} rows from {} in {:.2?}",
        records.len(),
        rows.len(),
        upload.filename,
        start.elapsed()
    );
    Ok(records.len())
}
