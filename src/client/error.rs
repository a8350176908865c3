//! Error types for the LivePaper client

use thiserror::Error;

/// Client-side validation failure, raised before any request is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Invalid value for field: {0}")]
    InvalidField(&'static str),
}

/// LivePaper client error type
#[derive(Error, Debug)]
pub enum LivePaperError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Result type for LivePaper operations
pub type LivePaperResult<T> = Result<T, LivePaperError>;

impl LivePaperError {
    pub fn api_error(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// True for a 404 answer from the API
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// True when the error was raised locally, before any request
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
