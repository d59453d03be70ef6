//! HeyGen REST API client.
//!
//! This crate provides:
//! - An injectable client for avatars, generation, job listing and status
//! - Retry with exponential backoff on configurable HTTP statuses
//! - Lenient decoding of provider payloads into domain types
//! - Request/retry metrics

pub mod client;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod types;

pub use client::{HeygenClient, HeygenConfig, DEFAULT_BASE_URL};
pub use error::{HeygenError, HeygenResult};
pub use retry::{with_retry, RetryConfig};
