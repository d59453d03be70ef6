//! Web front-end for HeyGen avatar video generation.
//!
//! This crate provides:
//! - HTML pages for browsing avatars, submitting scripts and listing videos
//! - JSON endpoints for playback, status checks and renaming
//! - Job synchronization between HeyGen and the local SQLite table
//! - Health, readiness and Prometheus metrics endpoints

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::JobSync;
pub use state::AppState;
