use actix_web::HttpResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Spreadsheet returned HTTP {0}")]
    FetchStatus(u16),

    #[error("Invalid spreadsheet link: {0}")]
    InvalidSheetLink(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, BackendError>;

impl BackendError {
    /// Builds the HTTP reply handlers send back for this error.
    pub fn to_response(&self) -> HttpResponse {
        match self {
            BackendError::NotFound(_) => HttpResponse::NotFound().body(self.to_string()),
            BackendError::InvalidRequest(_) | BackendError::InvalidSheetLink(_) => {
                HttpResponse::BadRequest().body(self.to_string())
            }
            _ => HttpResponse::ServiceUnavailable().body(self.to_string()),
        }
    }
}
