//! Error types for the HTTP collaborator and the timer registry.

use thiserror::Error;

/// Failures talking to the connector API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A path could not be joined onto the configured base URL.
    #[error("invalid endpoint '{path}': {source}")]
    Endpoint {
        /// Relative path that failed to resolve.
        path: &'static str,
        /// Underlying URL error.
        source: url::ParseError,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The request never produced a response.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        /// Endpoint that was called.
        endpoint: String,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Backend-provided `error` field, or a synthesised status line.
        message: String,
    },
    /// The response body was not the expected JSON document.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        /// Endpoint that was called.
        endpoint: String,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Status error with the generic message used when the body carries none.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self::Status {
            status,
            message: format!("HTTP error! status: {status}"),
        }
    }
}

/// Convenience alias for collaborator results.
pub type ApiResult<T> = Result<T, ApiError>;

/// The owning component was torn down while the caller was waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("component disposed")]
pub struct Disposed;
