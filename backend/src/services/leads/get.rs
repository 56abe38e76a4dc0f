use crate::store::LeadStore;
use actix_web::{web, HttpResponse, Responder};

/// Actix handler for `GET /api/leads/{lead_id}`.
pub async fn process(lead_id: web::Path<String>, store: web::Data<LeadStore>) -> impl Responder {
    match store.get(&lead_id) {
        Ok(lead) => HttpResponse::Ok().json(lead),
        Err(e) => e.to_response(),
    }
}
