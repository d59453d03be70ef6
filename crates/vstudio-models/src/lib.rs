//! Shared data models for the video studio.
//!
//! This crate provides:
//! - Locally persisted jobs and their canonical status vocabulary
//! - The provider-side job view and the pure reconciliation merge
//! - Avatar catalog and generation request types

pub mod avatar;
pub mod error;
pub mod generate;
pub mod job;
pub mod reconcile;
pub mod remote;

pub use avatar::{Avatar, AvatarCatalog, TalkingPhoto};
pub use error::{ModelError, ModelResult};
pub use generate::{Dimension, GenerateVideoRequest};
pub use job::{validate_title, Job, JobId, JobStatus, MAX_TITLE_LEN};
pub use reconcile::{reconcile, ReconcileOutcome, Reconciled};
pub use remote::RemoteJob;
