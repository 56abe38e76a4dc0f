use crate::config::AppConfig;
use crate::error::{BackendError, Result};
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::services::data_sources::csv::import::import_blocking;
use crate::store::LeadStore;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use common::jobs::JobStatus;
use common::requests::UploadResponse;
use futures_util::StreamExt;
use log::{info, warn};
use md5::Context;

/// A CSV file received from the client, fully buffered.
pub struct UploadedCsv {
    pub filename: String,
    pub md5: String,
    pub text: String,
}

/// HTTP handler for `POST /api/data_sources/csv/upload`.
///
/// - `200 OK` with an `UploadResponse` when the file was accepted or already
///   imported. The MD5 is claimed before the job starts, so uploading the same
///   file while its import is still running is a duplicate too.
/// - `400 Bad Request` when the upload is malformed.
pub async fn process(
    payload: Multipart,
    store: web::Data<LeadStore>,
    jobs: web::Data<JobsState>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    match upload_data_source(payload, &store, &jobs, config.upload_limit_bytes).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.to_response(),
    }
}

async fn upload_data_source(
    payload: Multipart,
    store: &LeadStore,
    jobs: &JobsState,
    limit: usize,
) -> Result<UploadResponse> {
    let upload = read_csv_field(payload, limit).await?;

    if !store.claim_import(&upload.md5, &upload.filename)? {
        info!("{} ({}) was imported before, skipping", upload.filename, upload.md5);
        return Ok(UploadResponse {
            job_id: None,
            duplicate: true,
        });
    }

    let job_id = schedule_import_job(jobs, store.clone(), upload).await;
    Ok(UploadResponse {
        job_id: Some(job_id),
        duplicate: false,
    })
}

/// Reads the `file` part of the multipart body, hashing it as it arrives.
async fn read_csv_field(mut payload: Multipart, limit: usize) -> Result<UploadedCsv> {
    let mut upload: Option<UploadedCsv> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| BackendError::InvalidRequest(e.to_string()))?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if field_name.as_deref() != Some("file") {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        if !filename.to_lowercase().ends_with(".csv") {
            return Err(BackendError::InvalidRequest(
                "The file must end with .csv".to_string(),
            ));
        }

        let mut md5_hasher = Context::new();
        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| BackendError::InvalidRequest(e.to_string()))?;
            if bytes.len() + chunk.len() > limit {
                return Err(BackendError::InvalidRequest(format!(
                    "{} is larger than {} bytes",
                    filename, limit
                )));
            }
            md5_hasher.consume(&chunk);
            bytes.extend_from_slice(&chunk);
        }

        let text = String::from_utf8(bytes)
            .map_err(|_| BackendError::InvalidRequest(format!("{} is not valid UTF-8", filename)))?;
        upload = Some(UploadedCsv {
            filename,
            md5: format!("{:x}", md5_hasher.finalize()),
            text: text.trim_start_matches('\u{feff}').to_string(),
        });
    }

    upload.ok_or_else(|| BackendError::InvalidRequest("Missing file".to_string()))
}

/// Registers an import job and runs it on the blocking pool.
///
/// Returns the job id immediately; progress goes through the job controller.
pub async fn schedule_import_job(jobs: &JobsState, store: LeadStore, upload: UploadedCsv) -> String {
    let job_id = jobs.register().await;
    let tx = jobs.tx.clone();
    let value = job_id.clone();

    tokio::spawn(async move {
        let tx_block = tx.clone();
        let job_for_blocking = value.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let result = import_blocking(&tx_block, &job_for_blocking, &store, &upload);
            if result.is_err() {
                if let Err(e) = store.release_import(&upload.md5) {
                    warn!("Could not release {}: {}", upload.md5, e);
                }
            }
            result
        });

        let status = match handle.await {
            Ok(Ok(imported)) => JobStatus::Completed(format!("{} leads imported", imported)),
            Ok(Err(e)) => JobStatus::Failed(e.to_string()),
            Err(join_err) => JobStatus::Failed(format!("join error: {}", join_err)),
        };
        let _ = tx
            .send(JobUpdate {
                job_id: value,
                status,
            })
            .await;
    });

    job_id
}
