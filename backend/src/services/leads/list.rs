use crate::store::LeadStore;
use actix_web::{web, HttpResponse, Responder};

/// Actix handler for `GET /api/leads`: every stored lead, oldest first.
pub async fn process(store: web::Data<LeadStore>) -> impl Responder {
    match store.list() {
        Ok(leads) => HttpResponse::Ok().json(leads),
        Err(e) => e.to_response(),
    }
}
