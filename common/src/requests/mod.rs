use crate::leads::LeadFilter;
use crate::model::lead::{LeadStatus, ReconciledLead};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Deserialize, Serialize, Debug, Clone)]
/// Payload for manually creating a lead.
pub struct CreateLeadRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub product: Option<String>,
    pub status: Option<LeadStatus>,
    pub assigned_to: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// Assigns a lead from the reconciled view. External-only leads get imported.
pub struct AssignLeadRequest {
    pub lead: ReconciledLead,
    pub assignee_id: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// Changes the status of a lead from the reconciled view. External-only leads get imported.
pub struct ChangeStatusRequest {
    pub lead: ReconciledLead,
    pub status: LeadStatus,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
/// Query string of the reconciled view.
pub struct ReconciledQuery {
    pub status: Option<LeadStatus>,
    pub assignee: Option<String>,
    /// Overrides the configured spreadsheet link for this request.
    pub sheet_url: Option<String>,
}

impl ReconciledQuery {
    pub fn filter(&self) -> LeadFilter {
        LeadFilter {
            status: self.status,
            assignee: self.assignee.clone(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// Response of the reconciled view: the filtered leads plus per-status totals
/// computed before filtering.
pub struct ReconciledView {
    pub leads: Vec<ReconciledLead>,
    pub counts: BTreeMap<LeadStatus, usize>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// Response of the CSV upload endpoint.
pub struct UploadResponse {
    pub job_id: Option<String>,
    /// True when the same file was imported before and no job was started.
    pub duplicate: bool,
}
