//! Keeps the local job table in step with the provider.
//!
//! Every read path that talks to HeyGen funnels its payloads through
//! [`JobSync::sync`], which reconciles against the stored record and writes
//! the result back with a single upsert.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use vstudio_heygen::HeygenClient;
use vstudio_models::{reconcile, validate_title, Job, JobId, Reconciled, RemoteJob};
use vstudio_store::{job_repo, Database};

use crate::error::{ApiError, ApiResult};
use crate::metrics::{record_job_renamed, record_job_submitted, record_reconcile};

/// Job synchronization service.
#[derive(Clone)]
pub struct JobSync {
    heygen: Arc<HeygenClient>,
    db: Database,
    list_limit: u32,
}

impl JobSync {
    pub fn new(heygen: Arc<HeygenClient>, db: Database, list_limit: u32) -> Self {
        Self {
            heygen,
            db,
            list_limit,
        }
    }

    /// Merge one remote payload into the local table.
    pub fn sync(&self, remote: &RemoteJob) -> ApiResult<Reconciled> {
        let local = job_repo::find_by_id(&self.db, &remote.id)?;
        let reconciled = reconcile(remote, local.as_ref(), Utc::now());

        if reconciled.changed() {
            job_repo::upsert(&self.db, &reconciled.job)?;
        }

        record_reconcile(reconciled.outcome);
        debug!(
            video_id = %remote.id,
            status = %reconciled.job.status,
            outcome = reconciled.outcome.as_str(),
            "Synced job"
        );

        Ok(reconciled)
    }

    /// Fetch the current status of one job and sync it.
    pub async fn refresh(&self, id: &JobId) -> ApiResult<Job> {
        let remote = self.heygen.video_status(id).await?;
        Ok(self.sync(&remote)?.job)
    }

    /// Fetch the most recent jobs and sync each one.
    ///
    /// Entries that fail to sync are logged and left out.
    pub async fn refresh_recent(&self, limit: u32) -> ApiResult<Vec<Job>> {
        let remotes = self.heygen.list_videos(limit).await?;

        let mut jobs = Vec::with_capacity(remotes.len());
        for remote in &remotes {
            match self.sync(remote) {
                Ok(reconciled) => jobs.push(reconciled.job),
                Err(e) => warn!(video_id = %remote.id, "Failed to sync job: {}", e),
            }
        }

        Ok(jobs)
    }

    /// URL to play the finished video, or `None` while it is not ready.
    ///
    /// The status endpoint sometimes lags behind the list endpoint, so a
    /// missing URL falls back to the job's entry in the recent list.
    pub async fn playback_url(&self, id: &JobId) -> ApiResult<Option<String>> {
        let job = self.refresh(id).await?;
        if job.video_url.is_some() {
            return Ok(job.video_url);
        }

        let remotes = match self.heygen.list_videos(self.list_limit).await {
            Ok(remotes) => remotes,
            Err(e) => {
                warn!(video_id = %id, "Video list fallback failed: {}", e);
                return Ok(None);
            }
        };

        match remotes.iter().find(|remote| &remote.id == id) {
            Some(remote) => Ok(self.sync(remote)?.job.video_url),
            None => Ok(None),
        }
    }

    /// Store a job the provider just accepted.
    pub fn record_submission(&self, id: JobId) -> ApiResult<Job> {
        let job = Job::submitted(id, Utc::now());

        if job_repo::insert_submitted(&self.db, &job)? {
            record_job_submitted();
            info!(video_id = %job.id, "Recorded new video job");
            return Ok(job);
        }

        warn!(video_id = %job.id, "Submitted job already known, keeping stored record");
        job_repo::find_by_id(&self.db, &job.id)?
            .ok_or_else(|| ApiError::internal(format!("job {} vanished after insert", job.id)))
    }

    /// Rename a job, returning the stored title.
    pub fn rename(&self, id: &JobId, raw_title: &str) -> ApiResult<String> {
        let title = validate_title(raw_title)?;

        if !job_repo::rename(&self.db, id, &title, Utc::now())? {
            return Err(ApiError::not_found(format!("Video {} not found", id)));
        }

        record_job_renamed();
        info!(video_id = %id, "Renamed video");
        Ok(title)
    }

    /// Stored jobs, newest first.
    pub fn stored(&self, limit: u32) -> ApiResult<Vec<Job>> {
        Ok(job_repo::list_recent(&self.db, limit)?)
    }
}
