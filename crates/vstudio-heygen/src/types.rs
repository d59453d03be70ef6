//! HeyGen wire types.
//!
//! Payloads are decoded leniently: the provider omits fields freely and
//! mixes numbers and strings for durations and timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use vstudio_models::{AvatarCatalog, GenerateVideoRequest, JobId, RemoteJob};

// =============================================================================
// Envelope
// =============================================================================

/// Common response wrapper of both API generations.
///
/// v1 endpoints use `code`/`message`, v2 endpoints use `error`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Provider-reported error text, if the envelope carries one.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().and_then(error_text)
    }
}

// =============================================================================
// Responses
// =============================================================================

pub type AvatarsData = AvatarCatalog;

#[derive(Debug, Deserialize)]
pub struct GenerateData {
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VideoListData {
    #[serde(default)]
    pub videos: Vec<VideoRecord>,
}

/// A job as returned by `video.list` or `video_status.get`.
#[derive(Debug, Default, Deserialize)]
pub struct VideoRecord {
    /// Set by `video.list`
    #[serde(default)]
    pub video_id: Option<String>,
    /// Set by `video_status.get`
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub duration: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub created_at: Option<Value>,
}

impl VideoRecord {
    /// Convert to the domain view, using `fallback_id` when the payload
    /// carries no identifier of its own.
    pub fn into_remote(self, fallback_id: Option<&JobId>) -> Option<RemoteJob> {
        let id = self
            .video_id
            .or(self.id)
            .filter(|s| !s.trim().is_empty())
            .map(JobId::from)
            .or_else(|| fallback_id.cloned())?;

        Some(RemoteJob {
            id,
            status: self.status,
            video_url: self.video_url,
            thumbnail_url: self.thumbnail_url,
            duration: self.duration.as_ref().and_then(scalar_text),
            error: self.error.as_ref().and_then(error_text),
            created_at: self.created_at.as_ref().and_then(timestamp),
        })
    }
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Serialize)]
pub struct GeneratePayload {
    pub video_inputs: Vec<VideoInput>,
    pub caption: bool,
    pub dimension: DimensionPayload,
}

#[derive(Debug, Serialize)]
pub struct VideoInput {
    pub character: Character,
    pub voice: Voice,
}

#[derive(Debug, Serialize)]
pub struct Character {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub avatar_id: String,
    pub avatar_style: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Voice {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub input_text: String,
    pub voice_id: String,
}

#[derive(Debug, Serialize)]
pub struct DimensionPayload {
    pub width: u32,
    pub height: u32,
}

impl From<&GenerateVideoRequest> for GeneratePayload {
    fn from(req: &GenerateVideoRequest) -> Self {
        Self {
            video_inputs: vec![VideoInput {
                character: Character {
                    kind: "avatar",
                    avatar_id: req.avatar_id.clone(),
                    avatar_style: "normal",
                },
                voice: Voice {
                    kind: "text",
                    input_text: req.input_text.clone(),
                    voice_id: req.voice_id.clone(),
                },
            }],
            caption: req.caption,
            dimension: DimensionPayload {
                width: req.dimension.width,
                height: req.dimension.height,
            },
        }
    }
}

// =============================================================================
// Value helpers
// =============================================================================

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Errors arrive either as plain strings or as `{code, message, detail}`.
fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => ["message", "detail", "code"]
            .iter()
            .find_map(|key| map.get(*key).and_then(scalar_text)),
        other => scalar_text(other),
    }
}

/// Unix seconds (integer or float) or an RFC 3339 string.
fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let secs = n.as_f64()?;
            DateTime::from_timestamp(secs.trunc() as i64, 0)
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}
