//! Turns user actions on a reconciled lead into store writes.
//!
//! Acting on an external-only row imports it: the result is a create carrying
//! a fresh id. Acting on a stored lead only touches the one field the action
//! is about. Mixing the two up is how the same person ends up stored twice.

use crate::model::lead::{
    normalize_assignee, source, ExternalLeadRow, LeadRecord, LeadStatus, ReconciledLead,
};
use crate::model::persist::{LeadChange, PersistOperation};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Assigns a lead, importing it first when it only exists externally.
pub fn promote(row: &ReconciledLead, assignee_id: &str) -> PersistOperation {
    promote_at(row, assignee_id, Utc::now())
}

/// [`promote`] with an explicit creation time.
pub fn promote_at(row: &ReconciledLead, assignee_id: &str, now: DateTime<Utc>) -> PersistOperation {
    let assignee = normalize_assignee(assignee_id);
    match row {
        ReconciledLead::ExternalOnly { row } => PersistOperation::Create {
            record: import_record(row, row.effective_status(), assignee, now),
        },
        ReconciledLead::Persisted { record, .. } => PersistOperation::Update {
            id: record.id.clone(),
            change: LeadChange::AssignedTo(assignee),
        },
    }
}

/// Moves a lead to `new_status`, importing it first when it only exists externally.
pub fn change_status(row: &ReconciledLead, new_status: LeadStatus) -> PersistOperation {
    change_status_at(row, new_status, Utc::now())
}

/// [`change_status`] with an explicit creation time.
pub fn change_status_at(
    row: &ReconciledLead,
    new_status: LeadStatus,
    now: DateTime<Utc>,
) -> PersistOperation {
    match row {
        ReconciledLead::ExternalOnly { row } => PersistOperation::Create {
            record: import_record(row, new_status, None, now),
        },
        ReconciledLead::Persisted { record, .. } => PersistOperation::Update {
            id: record.id.clone(),
            change: LeadChange::Status(new_status),
        },
    }
}

/// Imports an external row as-is, keeping its own provenance label.
///
/// Used by bulk file imports, where the `CSV: <file>` label is worth keeping.
pub fn import_at(row: &ExternalLeadRow, now: DateTime<Utc>) -> PersistOperation {
    let mut record = import_record(row, row.effective_status(), None, now);
    record.source = row.source.clone();
    PersistOperation::Create { record }
}

fn import_record(
    row: &ExternalLeadRow,
    status: LeadStatus,
    assigned_to: Option<String>,
    now: DateTime<Utc>,
) -> LeadRecord {
    LeadRecord {
        id: Uuid::new_v4().to_string(),
        name: row.name.trim().to_string(),
        email: row.email.clone(),
        phone: row.phone.clone(),
        product: row.product.clone(),
        status,
        source: source::SHEET_IMPORT.to_string(),
        assigned_to,
        created_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn external() -> ReconciledLead {
        ReconciledLead::ExternalOnly {
            row: ExternalLeadRow {
                email: Some("new@x.com".to_string()),
                phone: Some("555-2222".to_string()),
                product: Some("Whitening".to_string()),
                ..ExternalLeadRow::new("New Person", source::SHEET_LINK)
            },
        }
    }

    fn stored() -> ReconciledLead {
        ReconciledLead::Persisted {
            record: LeadRecord {
                id: "lead-1".to_string(),
                name: "Known".to_string(),
                email: Some("known@x.com".to_string()),
                phone: None,
                product: None,
                status: LeadStatus::InProgress,
                source: source::MANUAL_ENTRY.to_string(),
                assigned_to: Some("user7".to_string()),
                created_at: Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap(),
            },
            matched: true,
        }
    }

    #[test]
    fn promoting_external_row_creates_record() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();

        let op = promote_at(&external(), "user42", now);

        let PersistOperation::Create { record } = op else {
            panic!("expected create");
        };
        assert!(Uuid::parse_str(&record.id).is_ok());
        assert_eq!(record.assigned_to.as_deref(), Some("user42"));
        assert_eq!(record.source, source::SHEET_IMPORT);
        assert_eq!(record.status, LeadStatus::NewLead);
        assert_eq!(record.created_at, now);
        assert_eq!(record.product.as_deref(), Some("Whitening"));
        assert_eq!(record.email.as_deref(), Some("new@x.com"));
    }

    #[test]
    fn promoting_stored_lead_only_reassigns() {
        assert_eq!(
            promote(&stored(), "user42"),
            PersistOperation::Update {
                id: "lead-1".to_string(),
                change: LeadChange::AssignedTo(Some("user42".to_string())),
            }
        );
    }

    #[test]
    fn promoting_to_unassigned_clears_owner() {
        assert_eq!(
            promote(&stored(), "unassigned"),
            PersistOperation::Update {
                id: "lead-1".to_string(),
                change: LeadChange::AssignedTo(None),
            }
        );
    }

    #[test]
    fn external_row_keeps_its_own_status_on_import() {
        let mut lead = external();
        if let ReconciledLead::ExternalOnly { row } = &mut lead {
            row.status = Some(LeadStatus::Previous);
        }
        let op = promote(&lead, "user1");
        let PersistOperation::Create { record } = op else {
            panic!("expected create");
        };
        assert_eq!(record.status, LeadStatus::Previous);
    }

    #[test]
    fn status_change_on_external_row_imports_it() {
        let op = change_status(&external(), LeadStatus::Converted);
        let PersistOperation::Create { record } = op else {
            panic!("expected create");
        };
        assert_eq!(record.status, LeadStatus::Converted);
        assert_eq!(record.assigned_to, None);
        assert_eq!(record.source, source::SHEET_IMPORT);
    }

    #[test]
    fn status_change_on_stored_lead_updates_status_only() {
        assert_eq!(
            change_status(&stored(), LeadStatus::Dead),
            PersistOperation::Update {
                id: "lead-1".to_string(),
                change: LeadChange::Status(LeadStatus::Dead),
            }
        );
    }

    #[test]
    fn bulk_import_keeps_file_label() {
        let row = ExternalLeadRow::new("Bulk", source::csv_file("march.csv"));
        let op = import_at(&row, Utc::now());
        let PersistOperation::Create { record } = op else {
            panic!("expected create");
        };
        assert_eq!(record.source, "CSV: march.csv");
        assert_eq!(record.assigned_to, None);
        assert_eq!(record.status, LeadStatus::NewLead);
    }

    // Two users acting on the same external-only row at once get two creates
    // with distinct ids. Nothing here dedupes them; the store does not either.
    #[test]
    fn concurrent_promotions_of_same_row_create_twice() {
        let lead = external();
        let first = promote(&lead, "user1");
        let second = promote(&lead, "user2");
        assert!(first.is_create() && second.is_create());
        assert_ne!(first.target_id(), second.target_id());
    }
}
