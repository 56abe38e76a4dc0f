use crate::model::lead::{LeadRecord, LeadStatus};
use serde::{Deserialize, Serialize};

/// A single-field change applied to an existing lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadChange {
    AssignedTo(Option<String>),
    Status(LeadStatus),
}

/// Describes a write against the lead store.
///
/// Producing one never touches storage. The caller decides whether to await
/// the write, retry it, or fire it and update its local view optimistically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PersistOperation {
    Create { record: LeadRecord },
    Update { id: String, change: LeadChange },
}

impl PersistOperation {
    /// Id of the lead the operation writes to.
    pub fn target_id(&self) -> &str {
        match self {
            PersistOperation::Create { record } => &record.id,
            PersistOperation::Update { id, .. } => id,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, PersistOperation::Create { .. })
    }
}
