use crate::error::Result;
use crate::store::LeadStore;
use actix_web::{web, HttpResponse, Responder};
use common::leads::change_status;
use common::model::persist::PersistOperation;
use common::requests::ChangeStatusRequest;

/// Actix handler for `POST /api/leads/status`.
///
/// Changing the status of a spreadsheet-only lead imports it with that status.
pub async fn process(payload: web::Json<ChangeStatusRequest>, store: web::Data<LeadStore>) -> impl Responder {
    match change_lead_status(&payload, &store) {
        Ok(op) => HttpResponse::Ok().json(op),
        Err(e) => e.to_response(),
    }
}

pub fn change_lead_status(req: &ChangeStatusRequest, store: &LeadStore) -> Result<PersistOperation> {
    let op = change_status(&req.lead, req.status);
    store.apply(&op)?;
    Ok(op)
}
