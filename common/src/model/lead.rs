use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Provenance labels written into `source`.
pub mod source {
    /// Leads typed in through the API.
    pub const MANUAL_ENTRY: &str = "Manual Entry";
    /// Rows fetched from the shared spreadsheet, before they are persisted.
    pub const SHEET_LINK: &str = "Google Sheet Link";
    /// Label given to spreadsheet rows once an assignment or status change imports them.
    pub const SHEET_IMPORT: &str = "Google Sheet Import";

    /// Label for rows that came from an uploaded CSV file.
    pub fn csv_file(filename: &str) -> String {
        format!("CSV: {}", filename)
    }
}

/// Assignee value meaning "nobody owns this lead".
pub const UNASSIGNED: &str = "unassigned";

/// Maps an assignee id coming from a client to the stored representation.
///
/// Blank ids and the `unassigned` sentinel both clear the assignment.
pub fn normalize_assignee(assignee_id: &str) -> Option<String> {
    let trimmed = assignee_id.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNASSIGNED) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Pipeline stage of a lead.
///
/// There is no enforced transition order: any status can move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum LeadStatus {
    #[default]
    #[serde(rename = "New Lead")]
    NewLead,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Dead")]
    Dead,
    #[serde(rename = "Previous")]
    Previous,
    #[serde(rename = "Converted")]
    Converted,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::NewLead,
        LeadStatus::InProgress,
        LeadStatus::Dead,
        LeadStatus::Previous,
        LeadStatus::Converted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::NewLead => "New Lead",
            LeadStatus::InProgress => "In Progress",
            LeadStatus::Dead => "Dead",
            LeadStatus::Previous => "Previous",
            LeadStatus::Converted => "Converted",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown lead status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for LeadStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A lead stored in the backing store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    /// Assigned at creation, never changes.
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub product: Option<String>,
    pub status: LeadStatus,
    pub source: String,
    /// `None` when nobody owns the lead.
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A row read from an external tabular source (spreadsheet export or CSV upload).
///
/// These rows are rebuilt on every reconciliation pass and only reach the store
/// through a create operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalLeadRow {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub product: Option<String>,
    /// Absent means `New Lead`.
    pub status: Option<LeadStatus>,
    pub source: String,
}

impl ExternalLeadRow {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
            product: None,
            status: None,
            source: source.into(),
        }
    }

    pub fn effective_status(&self) -> LeadStatus {
        self.status.unwrap_or_default()
    }
}

/// One entry of the unified lead view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconciledLead {
    /// A stored lead. `matched` is set when some external row reconciled into it.
    Persisted { record: LeadRecord, matched: bool },
    /// An external row with no stored counterpart; importable.
    ExternalOnly { row: ExternalLeadRow },
}

impl ReconciledLead {
    pub fn id(&self) -> Option<&str> {
        match self {
            ReconciledLead::Persisted { record, .. } => Some(&record.id),
            ReconciledLead::ExternalOnly { .. } => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ReconciledLead::Persisted { record, .. } => &record.name,
            ReconciledLead::ExternalOnly { row } => &row.name,
        }
    }

    pub fn status(&self) -> LeadStatus {
        match self {
            ReconciledLead::Persisted { record, .. } => record.status,
            ReconciledLead::ExternalOnly { row } => row.effective_status(),
        }
    }

    pub fn assigned_to(&self) -> Option<&str> {
        match self {
            ReconciledLead::Persisted { record, .. } => record.assigned_to.as_deref(),
            ReconciledLead::ExternalOnly { .. } => None,
        }
    }

    pub fn is_external_only(&self) -> bool {
        matches!(self, ReconciledLead::ExternalOnly { .. })
    }
}
