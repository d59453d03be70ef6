//! Business logic services.

pub mod job_sync;

pub use job_sync::JobSync;
