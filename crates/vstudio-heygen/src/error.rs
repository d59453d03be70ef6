//! HeyGen client error types.

use thiserror::Error;

/// Result type for HeyGen operations.
pub type HeygenResult<T> = Result<T, HeygenError>;

/// Errors that can occur while talking to the HeyGen API.
#[derive(Debug, Error)]
pub enum HeygenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HeygenError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map a non-success HTTP status to an error.
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => Self::NotFound(message),
            _ => Self::Http { status, message },
        }
    }

    /// HTTP status associated with this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            HeygenError::NotFound(_) => Some(404),
            HeygenError::Http { status, .. } => Some(*status),
            HeygenError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Timeouts and connection failures; these never reached the API.
    pub fn is_transient_network(&self) -> bool {
        matches!(self, HeygenError::Network(e) if e.is_timeout() || e.is_connect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status_404() {
        let err = HeygenError::from_http_status(404, "missing");
        assert!(matches!(err, HeygenError::NotFound(_)));
        assert_eq!(err.http_status(), Some(404));
    }

    #[test]
    fn test_from_http_status_503() {
        let err = HeygenError::from_http_status(503, "unavailable");
        assert!(matches!(err, HeygenError::Http { status: 503, .. }));
        assert_eq!(err.http_status(), Some(503));
    }

    #[test]
    fn test_invalid_response_has_no_status() {
        let err = HeygenError::invalid_response("missing data");
        assert_eq!(err.http_status(), None);
        assert!(!err.is_transient_network());
    }
}
