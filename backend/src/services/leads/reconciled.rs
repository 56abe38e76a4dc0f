//! # Reconciled Lead View
//!
//! Backs `GET /api/leads/reconciled`. Each request:
//!
//! 1. Fetches the shared spreadsheet, if a link is given in `?sheet_url=` or
//!    configured. A failed fetch fails the request; it is never replaced by an
//!    empty sheet, which would make every spreadsheet-only lead vanish.
//! 2. Loads the stored leads and reconciles the two sources.
//! 3. Counts leads per status over the whole view, then applies the
//!    `status`/`assignee` filters to the returned list.

use crate::config::AppConfig;
use crate::error::Result;
use crate::services::data_sources::sheet::SheetClient;
use crate::store::LeadStore;
use actix_web::{web, HttpResponse, Responder};
use common::leads::{reconcile, status_counts};
use common::requests::{ReconciledQuery, ReconciledView};

pub async fn process(
    query: web::Query<ReconciledQuery>,
    store: web::Data<LeadStore>,
    config: web::Data<AppConfig>,
    sheets: web::Data<SheetClient>,
) -> impl Responder {
    match build_view(&query, &store, config.sheet_url.as_deref(), &sheets).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => e.to_response(),
    }
}

pub async fn build_view(
    query: &ReconciledQuery,
    store: &LeadStore,
    configured_sheet: Option<&str>,
    sheets: &SheetClient,
) -> Result<ReconciledView> {
    let external = match query.sheet_url.as_deref().or(configured_sheet) {
        Some(link) => sheets.fetch_rows(link).await?,
        None => Vec::new(),
    };
    let persisted = store.list()?;

    let view = reconcile(&persisted, &external);
    let counts = status_counts(&view);
    Ok(ReconciledView {
        leads: query.filter().apply(view),
        counts,
    })
}
