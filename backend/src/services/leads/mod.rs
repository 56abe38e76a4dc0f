//! # Lead Service Module
//!
//! Routes under `/api/leads`. Handlers are thin: they gather inputs, call the
//! reconciliation core in `common::leads` and apply the resulting write.
//!
//! ## Sub-modules:
//! - `list`: stored leads.
//! - `create`: manual lead entry.
//! - `get`: one stored lead by id.
//! - `reconciled`: spreadsheet rows merged with stored leads.
//! - `assign` / `status`: promotion flows that import spreadsheet-only leads
//!   on first touch and update stored ones in place.

mod assign;
mod create;
mod get;
mod list;
mod reconciled;
mod status;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

/// The base path for all lead endpoints.
const API_PATH: &str = "/api/leads";

/// Configures and returns the Actix `Scope` for lead routes.
///
/// # Registered Routes:
///
/// *   **`GET /`** — every stored lead.
/// *   **`POST /`** — create a lead by hand (`CreateLeadRequest`).
/// *   **`GET /reconciled`** — unified view with per-status counts; accepts
///     `status`, `assignee` and `sheet_url` query parameters.
/// *   **`POST /assign`** — `AssignLeadRequest`; replies with the applied operation.
/// *   **`POST /status`** — `ChangeStatusRequest`; replies with the applied operation.
/// *   **`GET /{lead_id}`** — one stored lead, `404` if unknown.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("", post().to(create::process))
        .route("/reconciled", get().to(reconciled::process))
        .route("/assign", post().to(assign::process))
        .route("/status", post().to(status::process))
        .route("/{lead_id}", get().to(get::process))
}
