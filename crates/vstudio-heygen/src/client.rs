//! HeyGen REST API client.
//!
//! The client is constructed explicitly from a [`HeygenConfig`] and passed to
//! whoever needs it; there is no process-wide session. Every call goes
//! through [`with_retry`] and is wrapped in a tracing span with metrics.

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info_span, Instrument};

use vstudio_models::{AvatarCatalog, GenerateVideoRequest, JobId, RemoteJob};

use crate::error::{HeygenError, HeygenResult};
use crate::metrics::record_request;
use crate::retry::{with_retry, RetryConfig};
use crate::types::{AvatarsData, Envelope, GenerateData, GeneratePayload, VideoListData, VideoRecord};

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.heygen.com";

const API_KEY_HEADER: &str = "x-api-key";

// =============================================================================
// Configuration
// =============================================================================

/// HeyGen client configuration.
#[derive(Clone)]
pub struct HeygenConfig {
    /// Static API key sent as `x-api-key`
    pub api_key: String,
    /// API host, without trailing slash
    pub base_url: String,
    /// Per-attempt request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl fmt::Debug for HeygenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeygenConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl HeygenConfig {
    /// Config with default endpoints, timeouts and retry policy.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Create config from environment variables.
    ///
    /// `HEYGEN_API_KEY` is required; everything else has a default.
    pub fn from_env() -> HeygenResult<Self> {
        let api_key = std::env::var("HEYGEN_API_KEY")
            .map_err(|_| HeygenError::config("HEYGEN_API_KEY must be set"))?;

        if api_key.trim().is_empty() {
            return Err(HeygenError::config("HEYGEN_API_KEY cannot be empty"));
        }

        let timeout_secs: u64 = std::env::var("HEYGEN_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let connect_timeout_secs: u64 = std::env::var("HEYGEN_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let config = Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
        };

        Ok(match std::env::var("HEYGEN_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => config.with_base_url(url.trim()),
            _ => config,
        })
    }
}

// =============================================================================
// Client
// =============================================================================

/// HeyGen REST API client.
#[derive(Clone)]
pub struct HeygenClient {
    http: Client,
    config: HeygenConfig,
}

impl HeygenClient {
    /// Create a new HeyGen client.
    pub fn new(config: HeygenConfig) -> HeygenResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(HeygenError::config("API key cannot be empty"));
        }

        let mut key = HeaderValue::from_str(config.api_key.trim())
            .map_err(|_| HeygenError::config("API key contains invalid header characters"))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("vstudio-heygen/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(HeygenError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> HeygenResult<Self> {
        Self::new(HeygenConfig::from_env()?)
    }

    pub fn config(&self) -> &HeygenConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// List avatars and talking photos.
    pub async fn list_avatars(&self) -> HeygenResult<AvatarCatalog> {
        let envelope: Envelope<AvatarsData> = self
            .get_json("list_avatars", "/v2/avatars", &[])
            .await?;
        require_data(envelope, "list_avatars")
    }

    /// Submit a generation job; returns the provider-assigned id.
    pub async fn generate_video(&self, request: &GenerateVideoRequest) -> HeygenResult<JobId> {
        let payload = GeneratePayload::from(request);
        let envelope: Envelope<GenerateData> = self
            .post_json("generate_video", "/v2/video/generate", &payload)
            .await?;

        require_data(envelope, "generate_video")?
            .video_id
            .filter(|id| !id.trim().is_empty())
            .map(JobId::from)
            .ok_or_else(|| HeygenError::invalid_response("generate_video: response has no video_id"))
    }

    /// Most recent jobs, newest first. Entries without an id are skipped.
    pub async fn list_videos(&self, limit: u32) -> HeygenResult<Vec<RemoteJob>> {
        let envelope: Envelope<VideoListData> = self
            .get_json("list_videos", "/v1/video.list", &[("limit", limit.to_string())])
            .await?;

        let videos = require_data(envelope, "list_videos")?.videos;
        let total = videos.len();
        let jobs: Vec<RemoteJob> = videos
            .into_iter()
            .filter_map(|record| record.into_remote(None))
            .collect();

        if jobs.len() < total {
            debug!(skipped = total - jobs.len(), "Skipped video list entries without id");
        }

        Ok(jobs)
    }

    /// Current status of a single job.
    pub async fn video_status(&self, id: &JobId) -> HeygenResult<RemoteJob> {
        let envelope: Envelope<VideoRecord> = self
            .get_json(
                "video_status",
                "/v1/video_status.get",
                &[("video_id", id.as_str().to_string())],
            )
            .await?;

        require_data(envelope, "video_status")?
            .into_remote(Some(id))
            .ok_or_else(|| HeygenError::invalid_response("video_status: response has no id"))
    }

    /// One-time reachability/credential check.
    pub async fn check_connectivity(&self) -> HeygenResult<()> {
        self.list_avatars().await.map(|_| ())
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> HeygenResult<T> {
        let url = self.url(path);
        let url = url.as_str();

        self.execute_request(
            operation,
            with_retry(&self.config.retry, operation, || async move {
                let response = self.http.get(url).query(query).send().await?;
                Self::decode(response, url).await
            }),
        )
        .await
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        body: &B,
    ) -> HeygenResult<T> {
        let url = self.url(path);
        let url = url.as_str();

        self.execute_request(
            operation,
            with_retry(&self.config.retry, operation, || async move {
                let response = self.http.post(url).json(body).send().await?;
                Self::decode(response, url).await
            }),
        )
        .await
    }

    /// Execute a request with tracing and metrics.
    async fn execute_request<T, F>(&self, operation: &str, fut: F) -> HeygenResult<T>
    where
        F: std::future::Future<Output = HeygenResult<T>>,
    {
        let span = info_span!("heygen_request", operation = %operation);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> HeygenResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(HeygenError::from_http_status(
                status.as_u16(),
                format!("{} failed: {}", url, prefix(&body)),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            HeygenError::invalid_response(format!(
                "Failed to parse response from {}: {} (body prefix: {})",
                url,
                e,
                prefix(&body)
            ))
        })
    }
}

fn require_data<T>(envelope: Envelope<T>, operation: &str) -> HeygenResult<T> {
    let error = envelope.error_message();
    match envelope.data {
        Some(data) => Ok(data),
        None => Err(HeygenError::invalid_response(format!(
            "{}: response has no data ({})",
            operation,
            error
                .or(envelope.message)
                .unwrap_or_else(|| "no error message".to_string())
        ))),
    }
}

fn prefix(body: &str) -> String {
    body.chars().take(200).collect()
}

// =============================================================================
// Tests
// =============================================================================
