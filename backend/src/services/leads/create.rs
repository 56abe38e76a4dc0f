use crate::error::{BackendError, Result};
use crate::store::LeadStore;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use common::model::lead::{normalize_assignee, source, LeadRecord};
use common::requests::CreateLeadRequest;
use uuid::Uuid;

/// Actix handler for `POST /api/leads`.
///
/// - `201 Created` with the stored `LeadRecord`.
/// - `400 Bad Request` when the name is blank.
pub async fn process(payload: web::Json<CreateLeadRequest>, store: web::Data<LeadStore>) -> impl Responder {
    match create_lead(payload.into_inner(), &store) {
        Ok(record) => HttpResponse::Created().json(record),
        Err(e) => e.to_response(),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn create_lead(req: CreateLeadRequest, store: &LeadStore) -> Result<LeadRecord> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(BackendError::InvalidRequest(
            "Lead name must not be empty".to_string(),
        ));
    }

    let record = LeadRecord {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: optional(req.email),
        phone: optional(req.phone),
        product: optional(req.product),
        status: req.status.unwrap_or_default(),
        source: source::MANUAL_ENTRY.to_string(),
        assigned_to: req.assigned_to.as_deref().and_then(normalize_assignee),
        created_at: Utc::now(),
    };
    store.insert(&record)?;
    Ok(record)
}
