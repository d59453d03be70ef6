//! Locally persisted video generation jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ModelError, ModelResult};

/// Maximum length of a user-supplied job title.
pub const MAX_TITLE_LEN: usize = 500;

/// Identifier assigned by the provider when a generation job is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Job status in canonical upper-case form.
///
/// The provider may introduce states we do not know about; those are kept
/// verbatim (upper-cased) in [`JobStatus::Other`] instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    #[default]
    Processing,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    /// Normalize a provider status string.
    ///
    /// A blank status is treated as `PROCESSING`, matching what the provider
    /// reports for freshly accepted jobs.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_uppercase();
        match normalized.as_str() {
            "" | "PROCESSING" => JobStatus::Processing,
            "PENDING" => JobStatus::Pending,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            _ => JobStatus::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Other(s) => s,
        }
    }

    /// Terminal success: the only state in which a video URL is kept.
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A video generation job as stored locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,

    /// User-editable display name
    pub name: String,

    pub status: JobStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    /// Only set once the job reached `COMPLETED`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// Provider error message for failed jobs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// Record for a job the provider just accepted.
    pub fn submitted(id: JobId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: format!("Video {}", now.format("%Y-%m-%d %H:%M:%S")),
            status: JobStatus::Processing,
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
            duration: None,
            error: None,
        }
    }

    /// Default display name for a job first seen through the provider.
    pub fn default_name(id: &JobId) -> String {
        format!("Video {}", id)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the two records differ in anything a user could observe,
    /// ignoring the update timestamp.
    pub fn content_differs(&self, other: &Job) -> bool {
        self.id != other.id
            || self.name != other.name
            || self.status != other.status
            || self.thumbnail_url != other.thumbnail_url
            || self.video_url != other.video_url
            || self.created_at != other.created_at
            || self.duration != other.duration
            || self.error != other.error
    }
}

/// Validate a rename request, returning the trimmed title.
pub fn validate_title(raw: &str) -> ModelResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ModelError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ModelError::TitleTooLong { max: MAX_TITLE_LEN });
    }
    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_normalizes_case() {
        assert_eq!(JobStatus::parse("completed"), JobStatus::Completed);
        assert_eq!(JobStatus::parse(" Failed "), JobStatus::Failed);
        assert_eq!(JobStatus::parse("pending"), JobStatus::Pending);
        assert_eq!(JobStatus::parse(""), JobStatus::Processing);
    }

    #[test]
    fn test_unknown_status_passes_through_upper_cased() {
        let status = JobStatus::parse("waiting");
        assert_eq!(status, JobStatus::Other("WAITING".to_string()));
        assert_eq!(status.as_str(), "WAITING");
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_success());
        assert!(!JobStatus::Failed.is_success());
    }

    #[test]
    fn test_status_serializes_as_string() {
        let json = serde_json::to_string(&JobStatus::Completed).unwrap();
        assert_eq!(json, "\"COMPLETED\"");
        let parsed: JobStatus = serde_json::from_str("\"processing\"").unwrap();
        assert_eq!(parsed, JobStatus::Processing);
    }

    #[test]
    fn test_submitted_job_is_processing() {
        let now = Utc::now();
        let job = Job::submitted(JobId::from("abc123"), now);
        assert_eq!(job.status, JobStatus::Processing);
        assert!(job.name.starts_with("Video "));
        assert_eq!(job.created_at, now);
        assert!(job.video_url.is_none());
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("  My clip ").unwrap(), "My clip");
        assert_eq!(validate_title("   "), Err(ModelError::EmptyTitle));
        assert_eq!(validate_title(""), Err(ModelError::EmptyTitle));

        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert_eq!(
            validate_title(&long),
            Err(ModelError::TitleTooLong { max: MAX_TITLE_LEN })
        );
    }
}
