//! Route and transport error types.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Result type for route operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building, sending or decoding a route call.
///
/// `Error` is `Clone` so a batched route can hand the same failure to every
/// caller of a window.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request building error.
    #[error("Failed to build request: {0}")]
    RequestBuild(String),

    /// Non-success response.
    #[error("Response error: {status} - {message}")]
    Response {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// The mapped response was rejected by the route validator.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Underlying HTTP client error.
    #[error("HTTP error: {0}")]
    Http(Arc<reqwest::Error>),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(Arc::new(error))
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Self::InvalidUrl(error.to_string())
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl Error {
    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_)) || matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Check if this is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_connect())
    }

    /// Check if the route validator rejected the response.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Get the HTTP status code if this is a response error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
