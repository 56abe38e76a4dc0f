//! CSV upload import.
//!
//! The provided routes are:
//! - `POST /api/data_sources/csv/upload`: multipart/form-data upload with a `file`
//!   field holding the CSV. The bytes are hashed with MD5; a file imported
//!   before is reported as a duplicate and nothing else happens. Otherwise a
//!   background job is started and its `job_id` returned. The job creates one
//!   lead per row that does not match a stored lead by email or phone.
//!
//! - `GET /api/data_sources/csv/status/{job_id}`: polls a job's `JobStatus`
//!   (`Pending`, `InProgress`, `Completed` or `Failed`) from the shared
//!   `JobsState`.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod get_status;
pub mod import;
pub mod upload;

const API_PATH: &str = "/api/data_sources/csv";

/// Configures and returns the Actix scope for CSV data source routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        // Route to get the status of an import job.
        .route("/status/{job_id}", get().to(get_status::process))
        // Route to upload a new CSV file.
        .route("/upload", post().to(upload::process))
}
