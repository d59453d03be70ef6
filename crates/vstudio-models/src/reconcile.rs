//! Merging a freshly fetched provider job into the local record.
//!
//! This is a pure function over already-fetched data: no I/O, no retries.
//! Callers persist the result only when [`Reconciled::changed`] is true.

use chrono::{DateTime, Utc};

use crate::job::{Job, JobStatus};
use crate::remote::RemoteJob;

/// What reconciliation did to the local record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No local record existed; one was synthesized.
    Created,
    /// An observable field changed.
    Updated,
    /// Only the update timestamp moved.
    Unchanged,
}

impl ReconcileOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::Created => "created",
            ReconcileOutcome::Updated => "updated",
            ReconcileOutcome::Unchanged => "unchanged",
        }
    }
}

/// Result of [`reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub job: Job,
    pub outcome: ReconcileOutcome,
}

impl Reconciled {
    /// Whether the record needs to be written back.
    pub fn changed(&self) -> bool {
        self.outcome != ReconcileOutcome::Unchanged
    }

    /// Whether further polling can still change the outcome.
    pub fn is_terminal(&self) -> bool {
        self.job.is_terminal()
    }
}

/// Merge `remote` into `local`.
///
/// - Status is normalized to upper case; unknown values pass through.
/// - A first-seen job gets a default name derived from its id.
/// - Name and creation time of an existing record are never touched.
/// - `video_url` survives only while the status is `COMPLETED`.
/// - `error` survives only while the status is `FAILED`.
/// - `updated_at` never moves backwards.
pub fn reconcile(remote: &RemoteJob, local: Option<&Job>, now: DateTime<Utc>) -> Reconciled {
    let status = remote.normalized_status();
    let remote_video_url = non_empty(remote.video_url.as_deref());
    let remote_thumbnail = non_empty(remote.thumbnail_url.as_deref());
    let remote_duration = non_empty(remote.duration.as_deref());
    let remote_error = non_empty(remote.error.as_deref());
    let failed = status == JobStatus::Failed;

    let Some(local) = local else {
        let video_url = if status.is_success() {
            remote_video_url
        } else {
            None
        };

        return Reconciled {
            job: Job {
                id: remote.id.clone(),
                name: Job::default_name(&remote.id),
                status,
                thumbnail_url: remote_thumbnail,
                video_url,
                created_at: remote.created_at.unwrap_or(now),
                updated_at: now,
                duration: remote_duration,
                error: remote_error.filter(|_| failed),
            },
            outcome: ReconcileOutcome::Created,
        };
    };

    // The status endpoint omits fields the list endpoint carries (and the
    // other way round), so an absent value keeps what we already know.
    let video_url = if status.is_success() {
        remote_video_url.or_else(|| local.video_url.clone())
    } else {
        None
    };

    let error = if failed {
        remote_error.or_else(|| local.error.clone())
    } else {
        None
    };

    let merged = Job {
        id: local.id.clone(),
        name: local.name.clone(),
        status,
        thumbnail_url: remote_thumbnail.or_else(|| local.thumbnail_url.clone()),
        video_url,
        created_at: local.created_at,
        updated_at: local.updated_at.max(now),
        duration: remote_duration.or_else(|| local.duration.clone()),
        error,
    };

    let outcome = if merged.content_differs(local) {
        ReconcileOutcome::Updated
    } else {
        ReconcileOutcome::Unchanged
    };

    Reconciled {
        job: merged,
        outcome,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobId;
    use chrono::Duration;

    fn existing(status: JobStatus) -> Job {
        let created = Utc::now() - Duration::hours(1);
        Job {
            id: JobId::from("abc123"),
            name: "Launch teaser".to_string(),
            status,
            thumbnail_url: Some("https://cdn.example/thumb.jpg".to_string()),
            video_url: None,
            created_at: created,
            updated_at: created,
            duration: None,
            error: None,
        }
    }

    #[test]
    fn test_first_seen_job_is_created() {
        let now = Utc::now();
        let remote = RemoteJob::new("abc123").with_status("processing");

        let result = reconcile(&remote, None, now);

        assert_eq!(result.outcome, ReconcileOutcome::Created);
        assert!(result.changed());
        assert_eq!(result.job.id.as_str(), "abc123");
        assert_eq!(result.job.name, "Video abc123");
        assert_eq!(result.job.status, JobStatus::Processing);
        assert!(result.job.video_url.is_none());
        assert_eq!(result.job.created_at, now);
        assert_eq!(result.job.updated_at, now);
    }

    #[test]
    fn test_first_seen_job_uses_remote_creation_time() {
        let now = Utc::now();
        let created = now - Duration::minutes(5);
        let mut remote = RemoteJob::new("abc123").with_status("pending");
        remote.created_at = Some(created);

        let result = reconcile(&remote, None, now);
        assert_eq!(result.job.created_at, created);
        assert_eq!(result.job.updated_at, now);
    }

    #[test]
    fn test_lower_case_completed_is_normalized() {
        let local = existing(JobStatus::Processing);
        let remote = RemoteJob::new("abc123")
            .with_status("completed")
            .with_video_url("https://cdn.example/video.mp4");

        let result = reconcile(&remote, Some(&local), Utc::now());

        assert_eq!(result.outcome, ReconcileOutcome::Updated);
        assert_eq!(result.job.status, JobStatus::Completed);
        assert_eq!(result.job.status.as_str(), "COMPLETED");
        assert_eq!(
            result.job.video_url.as_deref(),
            Some("https://cdn.example/video.mp4")
        );
        assert!(result.is_terminal());
    }

    #[test]
    fn test_name_and_created_at_are_preserved() {
        let local = existing(JobStatus::Processing);
        let remote = RemoteJob::new("abc123").with_status("failed");

        let result = reconcile(&remote, Some(&local), Utc::now());

        assert_eq!(result.job.name, "Launch teaser");
        assert_eq!(result.job.created_at, local.created_at);
    }

    #[test]
    fn test_identical_payload_is_unchanged() {
        let local = existing(JobStatus::Processing);
        let remote = RemoteJob::new("abc123")
            .with_status("PROCESSING")
            .with_thumbnail_url("https://cdn.example/thumb.jpg");

        let first = reconcile(&remote, Some(&local), Utc::now());
        assert_eq!(first.outcome, ReconcileOutcome::Unchanged);
        assert!(!first.changed());

        let second = reconcile(&remote, Some(&first.job), Utc::now());
        assert_eq!(second.outcome, ReconcileOutcome::Unchanged);
        assert!(!second.job.content_differs(&first.job));
        assert!(second.job.updated_at >= first.job.updated_at);
    }

    #[test]
    fn test_non_success_status_never_gets_video_url() {
        for status in ["processing", "pending", "failed", "waiting", ""] {
            let remote = RemoteJob::new("abc123")
                .with_status(status)
                .with_video_url("https://cdn.example/video.mp4");

            let created = reconcile(&remote, None, Utc::now());
            assert!(created.job.video_url.is_none(), "status {status:?}");

            let local = existing(JobStatus::Processing);
            let updated = reconcile(&remote, Some(&local), Utc::now());
            assert!(updated.job.video_url.is_none(), "status {status:?}");
        }
    }

    #[test]
    fn test_updated_at_never_moves_backwards() {
        let mut local = existing(JobStatus::Processing);
        let future = Utc::now() + Duration::minutes(10);
        local.updated_at = future;

        let remote = RemoteJob::new("abc123").with_status("completed");
        let result = reconcile(&remote, Some(&local), Utc::now());

        assert_eq!(result.job.updated_at, future);
    }

    #[test]
    fn test_absent_remote_fields_keep_local_values() {
        let mut local = existing(JobStatus::Completed);
        local.video_url = Some("https://cdn.example/video.mp4".to_string());
        local.duration = Some("12.5".to_string());

        let remote = RemoteJob::new("abc123").with_status("completed");
        let result = reconcile(&remote, Some(&local), Utc::now());

        assert_eq!(result.outcome, ReconcileOutcome::Unchanged);
        assert_eq!(result.job.video_url, local.video_url);
        assert_eq!(result.job.thumbnail_url, local.thumbnail_url);
        assert_eq!(result.job.duration.as_deref(), Some("12.5"));
    }

    #[test]
    fn test_failure_records_error_message() {
        let local = existing(JobStatus::Processing);
        let mut remote = RemoteJob::new("abc123").with_status("FAILED");
        remote.error = Some("avatar not found".to_string());

        let result = reconcile(&remote, Some(&local), Utc::now());

        assert_eq!(result.job.status, JobStatus::Failed);
        assert_eq!(result.job.error.as_deref(), Some("avatar not found"));
        assert!(result.is_terminal());
    }

    #[test]
    fn test_error_is_cleared_once_job_recovers() {
        let mut local = existing(JobStatus::Failed);
        local.error = Some("voice not found".to_string());

        let remote = RemoteJob::new("abc123")
            .with_status("completed")
            .with_video_url("https://cdn.example/video.mp4");
        let result = reconcile(&remote, Some(&local), Utc::now());

        assert_eq!(result.outcome, ReconcileOutcome::Updated);
        assert_eq!(result.job.status, JobStatus::Completed);
        assert!(result.job.error.is_none());

        let remote = RemoteJob::new("abc123").with_status("processing");
        let result = reconcile(&remote, Some(&local), Utc::now());
        assert!(result.job.error.is_none());
    }

    #[test]
    fn test_failed_job_keeps_known_error() {
        let mut local = existing(JobStatus::Failed);
        local.error = Some("voice not found".to_string());

        let remote = RemoteJob::new("abc123").with_status("failed");
        let result = reconcile(&remote, Some(&local), Utc::now());

        assert_eq!(result.outcome, ReconcileOutcome::Unchanged);
        assert_eq!(result.job.error.as_deref(), Some("voice not found"));
    }

    #[test]
    fn test_first_seen_job_drops_error_unless_failed() {
        let mut remote = RemoteJob::new("abc123").with_status("processing");
        remote.error = Some("transient".to_string());
        assert!(reconcile(&remote, None, Utc::now()).job.error.is_none());

        remote.status = Some("failed".to_string());
        let created = reconcile(&remote, None, Utc::now());
        assert_eq!(created.job.error.as_deref(), Some("transient"));
    }

    #[test]
    fn test_unknown_status_passes_through() {
        let remote = RemoteJob::new("abc123").with_status("Rendering");
        let result = reconcile(&remote, None, Utc::now());
        assert_eq!(result.job.status.as_str(), "RENDERING");
        assert!(!result.is_terminal());
    }
}
