//! Retry policy with exponential backoff.
//!
//! The delay before retry `n` (0-based) is `backoff_factor * 2^n` seconds,
//! so the default policy waits 1s, 2s and 4s between its four attempts.
//! Retries on:
//! - Configured HTTP statuses (500, 502, 503, 504 by default)
//! - Timeouts and connection failures
//!
//! Does NOT retry other 4xx responses or malformed payloads.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{info_span, warn, Instrument};

use crate::error::{HeygenError, HeygenResult};
use crate::metrics::record_retry;

// =============================================================================
// Configuration
// =============================================================================

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Base of the exponential backoff, in seconds.
    pub backoff_factor: f64,
    /// HTTP statuses that are worth retrying.
    pub retryable_statuses: HashSet<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 1.0,
            retryable_statuses: [500, 502, 503, 504].into_iter().collect(),
        }
    }
}

impl RetryConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_retries = std::env::var("HEYGEN_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_retries);

        let backoff_factor = std::env::var("HEYGEN_BACKOFF_FACTOR")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|f| f.is_finite() && *f >= 0.0)
            .unwrap_or(defaults.backoff_factor);

        let retryable_statuses = std::env::var("HEYGEN_RETRY_STATUSES")
            .ok()
            .map(|s| parse_statuses(&s))
            .filter(|set| !set.is_empty())
            .unwrap_or(defaults.retryable_statuses);

        Self {
            max_retries,
            backoff_factor,
            retryable_statuses,
        }
    }

    /// Delay to wait after the given failed attempt (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let secs = self.backoff_factor * 2f64.powi(attempt.min(30) as i32);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }

    /// Whether the error is worth another attempt under this policy.
    pub fn should_retry(&self, error: &HeygenError) -> bool {
        match error {
            HeygenError::Http { status, .. } => self.retryable_statuses.contains(status),
            HeygenError::Network(_) => error.is_transient_network(),
            _ => false,
        }
    }
}

fn parse_statuses(raw: &str) -> HashSet<u16> {
    raw.split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}

// =============================================================================
// Retry Policy
// =============================================================================

/// Execute an async operation with retry.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, operation: &str, op: F) -> HeygenResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = HeygenResult<T>>,
{
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        let span = info_span!("heygen_retry", operation = %operation, attempt = attempt + 1);

        match op().instrument(span).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < config.max_retries && config.should_retry(&e) => {
                let delay = config.delay_for(attempt);

                warn!(
                    operation = %operation,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "HeyGen request failed, retrying: {}",
                    e
                );

                record_retry(operation);

                tokio::time::sleep(delay).await;
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| HeygenError::invalid_response("retry loop exhausted")))
}

// =============================================================================
// Tests
// =============================================================================
