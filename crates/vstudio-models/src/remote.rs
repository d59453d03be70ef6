//! Provider-side view of a job, already decoded from the wire.

use chrono::{DateTime, Utc};

use crate::job::{JobId, JobStatus};

/// A job as last reported by the video provider.
///
/// Fields the provider did not include are `None`; empty strings are
/// treated the same way during reconciliation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteJob {
    pub id: JobId,
    /// Free-form provider status, any case
    pub status: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
    pub error: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl RemoteJob {
    pub fn new(id: impl Into<JobId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_video_url(mut self, url: impl Into<String>) -> Self {
        self.video_url = Some(url.into());
        self
    }

    pub fn with_thumbnail_url(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    /// Canonical status for this payload.
    pub fn normalized_status(&self) -> JobStatus {
        JobStatus::parse(self.status.as_deref().unwrap_or_default())
    }
}
