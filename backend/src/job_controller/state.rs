//! Tracks background import jobs.
//!
//! CSV uploads are imported outside the request/response cycle (see
//! `services/data_sources/csv/upload.rs`). Workers never write the job map
//! directly; they push `JobUpdate`s into a channel and `start_job_updater`
//! applies them, while the status endpoint only reads.

use common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// Shared, clonable handle on every job's latest status.
///
/// Created in `main.rs` and handed to Actix as `web::Data`.
#[derive(Clone)]
pub struct JobsState {
    /// Job id to latest status.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Sender used by workers to report progress.
    pub tx: mpsc::Sender<JobUpdate>,
}

/// A status change reported by a background worker.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobsState {
    /// Builds the state and the receiver `start_job_updater` must drain.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(capacity);
        let state = Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    /// Registers a new job as `Pending` and returns its id.
    pub async fn register(&self) -> String {
        let job_id = uuid::Uuid::new_v4().to_string();
        self.jobs
            .write()
            .await
            .insert(job_id.clone(), JobStatus::Pending);
        job_id
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }
}

/// Applies `JobUpdate`s to the shared map until every sender is dropped.
///
/// Spawned once at startup as a long-running task.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id, update.status);
    }
}
