use crate::error::Result;
use crate::store::LeadStore;
use actix_web::{web, HttpResponse, Responder};
use common::leads::promote;
use common::model::persist::PersistOperation;
use common::requests::AssignLeadRequest;

/// Actix handler for `POST /api/leads/assign`.
///
/// Replies with the `PersistOperation` that was applied: a `create` when the
/// lead only existed in the spreadsheet, an `update` otherwise.
pub async fn process(payload: web::Json<AssignLeadRequest>, store: web::Data<LeadStore>) -> impl Responder {
    match assign_lead(&payload, &store) {
        Ok(op) => HttpResponse::Ok().json(op),
        Err(e) => e.to_response(),
    }
}

pub fn assign_lead(req: &AssignLeadRequest, store: &LeadStore) -> Result<PersistOperation> {
    let op = promote(&req.lead, &req.assignee_id);
    store.apply(&op)?;
    Ok(op)
}
