//! Merges rows from an external source with the stored leads.
//!
//! A row and a stored lead describe the same person when their emails match
//! case-insensitively or their phones match exactly. Keys that are blank on
//! either side never contribute, so two rows without an email are not the same
//! lead just because both emails are empty.
//!
//! Email is checked across every stored lead before phone is considered. When
//! a row's email points at one lead and its phone at another, the email wins.

use crate::model::lead::{ExternalLeadRow, LeadRecord, LeadStatus, ReconciledLead};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which key tied an external row to a stored lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKey {
    Email,
    Phone,
}

/// Result of looking up one external row among the stored leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadMatch {
    /// Position of the matched lead in the persisted slice.
    pub index: usize,
    pub key: MatchKey,
}

fn key_of(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn emails_match(a: Option<&str>, b: Option<&str>) -> bool {
    match (key_of(a), key_of(b)) {
        (Some(a), Some(b)) => a.to_lowercase() == b.to_lowercase(),
        _ => false,
    }
}

/// Phones compare exactly as given. Whitespace only decides whether a phone
/// is blank, so `"555-1234 "` and `"555-1234"` are different phones.
fn phones_match(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => key_of(Some(a)).is_some() && a == b,
        _ => false,
    }
}

/// Finds the stored lead an external row belongs to, if any.
///
/// The first lead (in slice order) whose email matches wins; only when no
/// email matches is the first phone match taken.
pub fn find_match(persisted: &[LeadRecord], row: &ExternalLeadRow) -> Option<LeadMatch> {
    persisted
        .iter()
        .position(|record| emails_match(record.email.as_deref(), row.email.as_deref()))
        .map(|index| LeadMatch {
            index,
            key: MatchKey::Email,
        })
        .or_else(|| {
            persisted
                .iter()
                .position(|record| phones_match(record.phone.as_deref(), row.phone.as_deref()))
                .map(|index| LeadMatch {
                    index,
                    key: MatchKey::Phone,
                })
        })
}

/// Builds the de-duplicated lead view.
///
/// Every stored lead is emitted once, in input order, with its stored values;
/// `matched` records whether an external row reconciled into it. External rows
/// without a stored counterpart follow in input order as external-only entries.
/// Rows with a blank name take no part.
pub fn reconcile(persisted: &[LeadRecord], external: &[ExternalLeadRow]) -> Vec<ReconciledLead> {
    let mut matched = vec![false; persisted.len()];
    let mut unmatched = Vec::new();

    for row in external.iter().filter(|row| !row.name.trim().is_empty()) {
        match find_match(persisted, row) {
            Some(found) => matched[found.index] = true,
            None => unmatched.push(ReconciledLead::ExternalOnly { row: row.clone() }),
        }
    }

    let mut view: Vec<ReconciledLead> = persisted
        .iter()
        .zip(matched)
        .map(|(record, matched)| ReconciledLead::Persisted {
            record: record.clone(),
            matched,
        })
        .collect();
    view.extend(unmatched);
    view
}

/// Number of leads per status, with every status present.
pub fn status_counts(view: &[ReconciledLead]) -> BTreeMap<LeadStatus, usize> {
    let mut counts: BTreeMap<LeadStatus, usize> =
        LeadStatus::ALL.into_iter().map(|status| (status, 0)).collect();
    for lead in view {
        *counts.entry(lead.status()).or_default() += 1;
    }
    counts
}

/// Narrows a reconciled view the way the dashboard tabs do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    /// An assignee id, or the `unassigned` sentinel for leads nobody owns.
    pub assignee: Option<String>,
}

impl LeadFilter {
    pub fn matches(&self, lead: &ReconciledLead) -> bool {
        if let Some(status) = self.status {
            if lead.status() != status {
                return false;
            }
        }
        match self.assignee.as_deref() {
            None => true,
            Some(wanted) => match crate::model::lead::normalize_assignee(wanted) {
                None => lead.assigned_to().is_none(),
                Some(id) => lead.assigned_to() == Some(id.as_str()),
            },
        }
    }

    pub fn apply(&self, view: Vec<ReconciledLead>) -> Vec<ReconciledLead> {
        view.into_iter().filter(|lead| self.matches(lead)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lead::source;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn record(id: &str, email: Option<&str>, phone: Option<&str>) -> LeadRecord {
        LeadRecord {
            id: id.to_string(),
            name: format!("Lead {}", id),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            product: None,
            status: LeadStatus::NewLead,
            source: source::MANUAL_ENTRY.to_string(),
            assigned_to: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    fn row(name: &str, email: Option<&str>, phone: Option<&str>) -> ExternalLeadRow {
        ExternalLeadRow {
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            ..ExternalLeadRow::new(name, source::SHEET_LINK)
        }
    }

    #[test]
    fn empty_inputs_give_empty_view() {
        assert!(reconcile(&[], &[]).is_empty());
    }

    #[test]
    fn disjoint_sources_are_concatenated() {
        let persisted = vec![
            record("1", Some("a@x.com"), Some("111")),
            record("2", None, Some("222")),
        ];
        let external = vec![
            row("C", Some("c@x.com"), None),
            row("D", None, Some("444")),
            row("E", None, None),
        ];

        let view = reconcile(&persisted, &external);

        assert_eq!(view.len(), 5);
        for (lead, original) in view.iter().zip(&persisted) {
            assert_eq!(
                lead,
                &ReconciledLead::Persisted {
                    record: original.clone(),
                    matched: false
                }
            );
        }
        assert!(view[2..].iter().all(ReconciledLead::is_external_only));
    }

    #[test]
    fn email_match_ignores_case() {
        let persisted = vec![record("1", Some("a@x.com"), None)];
        let external = vec![row("A", Some("A@X.COM"), None)];

        let view = reconcile(&persisted, &external);

        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id(), Some("1"));
    }

    #[test]
    fn phone_match_reconciles_despite_different_email() {
        let persisted = vec![record("1", Some("old@x.com"), Some("555-1234"))];
        let external = vec![row("A", Some("new@x.com"), Some("555-1234"))];

        let found = find_match(&persisted, &external[0]);
        assert_eq!(found, Some(LeadMatch { index: 0, key: MatchKey::Phone }));
        assert_eq!(reconcile(&persisted, &external).len(), 1);
    }

    #[test]
    fn phones_must_be_exactly_equal() {
        let persisted = vec![record("1", None, Some("555-1234"))];
        let external = vec![row("A", None, Some("555-1234 ")), row("B", None, Some("5551234"))];

        let view = reconcile(&persisted, &external);

        assert_eq!(view.len(), 3);
        assert_eq!(view[0], ReconciledLead::Persisted { record: persisted[0].clone(), matched: false });
    }

    #[test]
    fn rows_sharing_a_lead_collapse_into_it() {
        let persisted = vec![record("1", Some("a@x.com"), Some("555-1111"))];
        let external = vec![
            row("By Email", Some("A@x.com"), None),
            row("By Phone", None, Some("555-1111")),
        ];

        let view = reconcile(&persisted, &external);

        assert_eq!(
            view,
            vec![ReconciledLead::Persisted {
                record: persisted[0].clone(),
                matched: true
            }]
        );
    }

    #[test]
    fn empty_keys_never_match() {
        let persisted = vec![record("1", Some(""), Some(""))];
        let external = vec![row("A", Some(""), Some("  "))];

        let view = reconcile(&persisted, &external);

        assert_eq!(view.len(), 2);
        assert!(view[1].is_external_only());
    }

    #[test]
    fn persisted_values_win_on_match() {
        let persisted = vec![record("1", Some("x@y.com"), Some(""))];
        let external = vec![row("X", Some("x@y.com"), Some("555-0000"))];

        let view = reconcile(&persisted, &external);

        assert_eq!(view.len(), 1);
        match &view[0] {
            ReconciledLead::Persisted { record, matched } => {
                assert!(matched);
                assert_eq!(record.id, "1");
                assert_eq!(record.status, LeadStatus::NewLead);
                assert_eq!(record.phone.as_deref(), Some(""));
            }
            other => panic!("expected persisted lead, got {:?}", other),
        }
    }

    #[test]
    fn email_is_checked_before_phone() {
        // First lead shares the phone, second shares the email.
        let persisted = vec![
            record("phone-owner", Some("someone@x.com"), Some("555-9999")),
            record("email-owner", Some("dup@x.com"), Some("555-0001")),
        ];
        let external = row("Dup", Some("DUP@x.com"), Some("555-9999"));

        let found = find_match(&persisted, &external);

        assert_eq!(found, Some(LeadMatch { index: 1, key: MatchKey::Email }));
        let view = reconcile(&persisted, &[external]);
        assert_eq!(
            view.iter()
                .map(|lead| matches!(lead, ReconciledLead::Persisted { matched: true, .. }))
                .collect::<Vec<_>>(),
            vec![false, true]
        );
    }

    #[test]
    fn duplicate_stored_emails_resolve_to_first() {
        let persisted = vec![
            record("1", Some("same@x.com"), None),
            record("2", Some("same@x.com"), None),
        ];
        let found = find_match(&persisted, &row("S", Some("same@x.com"), None));
        assert_eq!(found.map(|m| m.index), Some(0));
    }

    #[test]
    fn blank_names_are_ignored() {
        let external = vec![row("  ", Some("ghost@x.com"), None)];
        assert!(reconcile(&[], &external).is_empty());
    }

    #[test]
    fn reconcile_is_deterministic() {
        let persisted = vec![record("1", Some("a@x.com"), None)];
        let external = vec![row("A", Some("a@x.com"), None), row("B", None, Some("9"))];
        assert_eq!(reconcile(&persisted, &external), reconcile(&persisted, &external));
    }

    #[test]
    fn counts_cover_every_status() {
        let mut converted = record("1", None, None);
        converted.status = LeadStatus::Converted;
        let mut external = row("B", None, None);
        external.status = Some(LeadStatus::Dead);

        let counts = status_counts(&reconcile(&[converted], &[external, row("C", None, None)]));

        assert_eq!(counts.len(), LeadStatus::ALL.len());
        assert_eq!(counts[&LeadStatus::Converted], 1);
        assert_eq!(counts[&LeadStatus::Dead], 1);
        assert_eq!(counts[&LeadStatus::NewLead], 1);
        assert_eq!(counts[&LeadStatus::InProgress], 0);
    }

    #[test]
    fn filter_by_assignee_and_status() {
        let mut mine = record("1", None, None);
        mine.assigned_to = Some("user42".to_string());
        mine.status = LeadStatus::InProgress;
        let view = reconcile(&[mine, record("2", None, None)], &[row("C", None, None)]);

        let by_owner = LeadFilter {
            assignee: Some("user42".to_string()),
            ..LeadFilter::default()
        };
        assert_eq!(by_owner.apply(view.clone()).len(), 1);

        let unassigned = LeadFilter {
            assignee: Some("unassigned".to_string()),
            ..LeadFilter::default()
        };
        assert_eq!(unassigned.apply(view.clone()).len(), 2);

        let fresh = LeadFilter {
            status: Some(LeadStatus::NewLead),
            assignee: None,
        };
        assert_eq!(fresh.apply(view).len(), 2);
    }
}
