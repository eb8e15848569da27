//! Error types for Musing.

use thiserror::Error;

/// Result type alias using Musing's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Musing.
#[derive(Error, Debug)]
pub enum Error {
    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] HttpError),

    #[error("Network error: {0}")]
    Network(String),

    // Provider payload errors
    #[error("Failed to parse {provider} response: {message}")]
    Parse { provider: String, message: String },

    #[error("{0} returned no quote data")]
    EmptyPayload(String),

    #[error("{provider} returned an error message as a quote: {excerpt}")]
    ErrorPayload { provider: String, excerpt: String },

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// HTTP-specific errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed with status {status}: {message}")]
    StatusError { status: u16, message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Returns true if the failure came from the upstream provider
    /// (transport, status, or payload) rather than from local state.
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Network(_)
                | Self::Parse { .. }
                | Self::EmptyPayload(_)
                | Self::ErrorPayload { .. }
        )
    }

    /// Returns true if the provider answered successfully but the body was an error notice.
    pub const fn is_error_payload(&self) -> bool {
        matches!(self, Self::ErrorPayload { .. })
    }
}
