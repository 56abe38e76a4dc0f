//! # Shared Spreadsheet Fetch
//!
//! Downloads the shared lead spreadsheet as CSV and parses it into external
//! rows. A Google Sheets link as copied from the browser
//! (`https://docs.google.com/spreadsheets/d/<id>/edit#gid=<gid>`) is rewritten
//! to its CSV export address first, and a published one
//! (`.../d/e/<publish id>/pubhtml`) to its `pub?output=csv` form. Any other
//! `http(s)` link is fetched as-is.
//!
//! Failures (bad link, timeout, non-2xx reply) go back to the caller untouched.
//! Nothing is retried or cached: every reconciliation pass fetches again.

use crate::error::{BackendError, Result};
use actix_web::{web, HttpResponse, Responder};
use common::import::csv::parse_lead_rows;
use common::model::lead::{source, ExternalLeadRow};
use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

use crate::config::AppConfig;

/// Turns a spreadsheet link into the URL that serves its CSV export.
pub fn export_url(link: &str) -> Result<String> {
    let link = link.trim();
    if !(link.starts_with("https://") || link.starts_with("http://")) {
        return Err(BackendError::InvalidSheetLink(link.to_string()));
    }

    if link.contains("format=csv") || link.contains("output=csv") {
        return Ok(link.to_string());
    }

    // "Publish to web" links carry a publish id under `/d/e/` and export
    // through `/pub`, not `/export`.
    let published_re =
        Regex::new(r"^https?://docs\.google\.com/spreadsheets/d/e/([A-Za-z0-9_-]+)")
            .map_err(|e| BackendError::Internal(format!("Regex error: {}", e)))?;
    let sheet_re = Regex::new(r"^https?://docs\.google\.com/spreadsheets/d/([A-Za-z0-9_-]+)")
        .map_err(|e| BackendError::Internal(format!("Regex error: {}", e)))?;
    let mut url = if let Some(caps) = published_re.captures(link) {
        format!(
            "https://docs.google.com/spreadsheets/d/e/{}/pub?output=csv",
            &caps[1]
        )
    } else if let Some(caps) = sheet_re.captures(link) {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=csv",
            &caps[1]
        )
    } else {
        return Ok(link.to_string());
    };

    let gid_re = Regex::new(r"[#?&]gid=(\d+)")
        .map_err(|e| BackendError::Internal(format!("Regex error: {}", e)))?;
    if let Some(gid) = gid_re.captures(link) {
        url.push_str("&gid=");
        url.push_str(&gid[1]);
    }
    Ok(url)
}

/// HTTP client for the shared spreadsheet.
#[derive(Clone)]
pub struct SheetClient {
    client: reqwest::Client,
}

impl SheetClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Fetches and parses the spreadsheet behind `link`.
    pub async fn fetch_rows(&self, link: &str) -> Result<Vec<ExternalLeadRow>> {
        let url = export_url(link)?;
        debug!("Fetching lead sheet from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Lead sheet fetch failed: {}", e);
            BackendError::from(e)
        })?;
        let status = response.status();
        if !status.is_success() {
            warn!("Lead sheet answered {}", status);
            return Err(BackendError::FetchStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let rows = parse_lead_rows(&body, source::SHEET_LINK);
        debug!("Lead sheet yielded {} rows", rows.len());
        Ok(rows)
    }
}

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub url: Option<String>,
}

/// Actix handler for `GET /api/data_sources/sheet/preview`.
///
/// Returns the parsed rows of the sheet given in `?url=`, or of the configured
/// sheet when no link is passed.
pub async fn process(
    query: web::Query<PreviewQuery>,
    config: web::Data<AppConfig>,
    sheets: web::Data<SheetClient>,
) -> impl Responder {
    let link = match query.url.as_deref().or(config.sheet_url.as_deref()) {
        Some(link) => link.to_string(),
        None => return HttpResponse::NotFound().body("No spreadsheet link configured"),
    };
    match sheets.fetch_rows(&link).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => e.to_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_link_becomes_export_url() {
        let url = export_url(
            "https://docs.google.com/spreadsheets/d/1AbC-d_9/edit#gid=123456",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://docs.google.com/spreadsheets/d/1AbC-d_9/export?format=csv&gid=123456"
        );
    }

    #[test]
    fn published_link_keeps_publish_id() {
        let url = export_url(
            "https://docs.google.com/spreadsheets/d/e/2PACX-1vQabc/pubhtml?gid=0&single=true",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://docs.google.com/spreadsheets/d/e/2PACX-1vQabc/pub?output=csv&gid=0"
        );
        assert_eq!(
            export_url("https://docs.google.com/spreadsheets/d/e/2PACX-1vQabc/pub").unwrap(),
            "https://docs.google.com/spreadsheets/d/e/2PACX-1vQabc/pub?output=csv"
        );
    }

    #[test]
    fn link_without_gid_exports_first_tab() {
        let url = export_url("https://docs.google.com/spreadsheets/d/XYZ/edit?usp=sharing").unwrap();
        assert_eq!(url, "https://docs.google.com/spreadsheets/d/XYZ/export?format=csv");
    }

    #[test]
    fn csv_links_pass_through() {
        let published = "https://docs.google.com/spreadsheets/d/XYZ/pub?output=csv";
        assert_eq!(export_url(published).unwrap(), published);
        assert_eq!(
            export_url(" https://example.com/leads.csv ").unwrap(),
            "https://example.com/leads.csv"
        );
    }

    #[test]
    fn non_http_links_are_rejected() {
        assert!(matches!(
            export_url("docs.google.com/spreadsheets/d/XYZ"),
            Err(BackendError::InvalidSheetLink(_))
        ));
        assert!(matches!(export_url(""), Err(BackendError::InvalidSheetLink(_))));
    }
}
