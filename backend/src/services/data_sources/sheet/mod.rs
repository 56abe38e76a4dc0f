//! Shared spreadsheet data source.
//!
//! - `GET /api/data_sources/sheet/preview?url=`: fetches the spreadsheet (the
//!   given link, or the configured one) and returns its parsed lead rows
//!   without touching the store.

use actix_web::web::{get, scope};
use actix_web::Scope;

pub mod fetch;

pub use fetch::SheetClient;

const API_PATH: &str = "/api/data_sources/sheet";

/// Configures and returns the Actix scope for spreadsheet routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/preview", get().to(fetch::process))
}
