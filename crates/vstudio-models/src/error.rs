//! Validation errors for user-supplied model input.

use thiserror::Error;

/// Result type for model validation.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title too long (max {max} characters)")]
    TitleTooLong { max: usize },

    #[error("Invalid dimension '{0}', expected WIDTHxHEIGHT")]
    InvalidDimension(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
