//! # Lead Store
//!
//! SQLite persistence for leads and for the record of CSV files already
//! imported. A connection is opened per operation against the configured
//! database file, so the store itself is cheap to clone and share between
//! request handlers and blocking import workers.
//!
//! The store applies [`PersistOperation`]s produced by the reconciliation core.
//! It does not dedupe: two creates for the same person yield two rows.

use crate::error::{BackendError, Result};
use chrono::{DateTime, Utc};
use common::model::lead::{LeadRecord, LeadStatus};
use common::model::persist::{LeadChange, PersistOperation};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS leads (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT,
    phone       TEXT,
    product     TEXT,
    status      TEXT NOT NULL,
    source      TEXT NOT NULL,
    assigned_to TEXT,
    created_at  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS imports (
    md5        TEXT PRIMARY KEY,
    filename   TEXT NOT NULL,
    imported   INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
";

const LEAD_COLUMNS: &str =
    "id, name, email, phone, product, status, source, assigned_to, created_at";

#[derive(Debug, Clone)]
pub struct LeadStore {
    path: PathBuf,
}

impl LeadStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    /// Creates the tables if they do not exist yet.
    pub fn init(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// All stored leads, oldest first.
    pub fn list(&self) -> Result<Vec<LeadRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM leads ORDER BY created_at, rowid",
            LEAD_COLUMNS
        ))?;
        let raw = stmt
            .query_map([], RawLead::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        raw.into_iter().map(RawLead::into_record).collect()
    }

    pub fn get(&self, id: &str) -> Result<LeadRecord> {
        let conn = self.connect()?;
        conn.query_row(
            &format!("SELECT {} FROM leads WHERE id = ?1", LEAD_COLUMNS),
            params![id],
            RawLead::from_row,
        )
        .optional()?
        .ok_or_else(|| BackendError::NotFound(format!("lead {}", id)))?
        .into_record()
    }

    pub fn insert(&self, record: &LeadRecord) -> Result<()> {
        let conn = self.connect()?;
        insert_with(&conn, record)
    }

    /// Inserts a batch of records in one transaction.
    pub fn insert_all(&self, records: &[LeadRecord]) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        for record in records {
            insert_with(&tx, record)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Performs the write an operation describes.
    pub fn apply(&self, op: &PersistOperation) -> Result<()> {
        match op {
            PersistOperation::Create { record } => {
                self.insert(record)?;
                info!("Created lead {} ({})", record.id, record.source);
            }
            PersistOperation::Update { id, change } => {
                let conn = self.connect()?;
                let changed = match change {
                    LeadChange::AssignedTo(assignee) => conn.execute(
                        "UPDATE leads SET assigned_to = ?1 WHERE id = ?2",
                        params![assignee, id],
                    )?,
                    LeadChange::Status(status) => conn.execute(
                        "UPDATE leads SET status = ?1 WHERE id = ?2",
                        params![status.as_str(), id],
                    )?,
                };
                if changed == 0 {
                    return Err(BackendError::NotFound(format!("lead {}", id)));
                }
                info!("Updated lead {}: {:?}", id, change);
            }
        }
        Ok(())
    }

    /// Reserves an uploaded file's MD5 before its import starts.
    ///
    /// Returns `false` when the file was claimed before, by a finished import
    /// or one still running.
    pub fn claim_import(&self, md5: &str, filename: &str) -> Result<bool> {
        let conn = self.connect()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO imports (md5, filename, imported, created_at) VALUES (?1, ?2, 0, ?3)",
            params![md5, filename, Utc::now().to_rfc3339()],
        )?;
        Ok(inserted == 1)
    }

    /// Stores how many leads a claimed file produced.
    pub fn record_import(&self, md5: &str, filename: &str, imported: usize) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO imports (md5, filename, imported, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(md5) DO UPDATE SET imported = excluded.imported",
            params![md5, filename, imported as i64, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Forgets a claim so a failed import can be uploaded again.
    pub fn release_import(&self, md5: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM imports WHERE md5 = ?1", params![md5])?;
        Ok(())
    }

    #[cfg(test)]
    fn imported_count(&self, md5: &str) -> Result<Option<usize>> {
        let conn = self.connect()?;
        let count: Option<i64> = conn
            .query_row(
                "SELECT imported FROM imports WHERE md5 = ?1",
                params![md5],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count.map(|n| n as usize))
    }
}

fn insert_with(conn: &Connection, record: &LeadRecord) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO leads ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            LEAD_COLUMNS
        ),
        params![
            &record.id,
            &record.name,
            &record.email,
            &record.phone,
            &record.product,
            record.status.as_str(),
            &record.source,
            &record.assigned_to,
            record.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// A `leads` row before status and timestamp are parsed.
struct RawLead {
    id: String,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    product: Option<String>,
    status: String,
    source: String,
    assigned_to: Option<String>,
    created_at: String,
}

impl RawLead {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            product: row.get(4)?,
            status: row.get(5)?,
            source: row.get(6)?,
            assigned_to: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn into_record(self) -> Result<LeadRecord> {
        let status: LeadStatus = self
            .status
            .parse()
            .map_err(|e| BackendError::Corrupt(format!("lead {}: {}", self.id, e)))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| BackendError::Corrupt(format!("lead {}: {}", self.id, e)))?
            .with_timezone(&Utc);
        Ok(LeadRecord {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            product: self.product,
            status,
            source: self.source,
            assigned_to: self.assigned_to,
            created_at,
        })
    }
}
