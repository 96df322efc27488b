//! Tool-specific error types.

use thiserror::Error;

/// Boxed error returned by tool implementations.
///
/// Anything convertible into it (`String`, `&str`, `std::io::Error`,
/// `anyhow::Error`, ...) can be returned with `?`; the registry reports its
/// message.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while configuring a registry.
///
/// Invocation failures never use this type; they are reported through
/// [`InvokeResult`](super::InvokeResult).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A tool with this name is already registered.
    #[error("Tool \"{0}\" is already registered")]
    DuplicateTool(String),
}

impl RegistryError {
    /// Create a new "duplicate tool" error.
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateTool(name.into())
    }
}

/// Errors raised by the HTTP tool client's discovery call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request did not complete within the configured timeout.
    #[error("Request timeout after {0}ms")]
    Timeout(u128),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {status_text}")]
    Status { status: u16, status_text: String },

    /// The base URL could not be turned into an endpoint URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid header name or value in the client options.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Transport-level failure.
    #[cfg(feature = "http")]
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(status: u16, status_text: impl Into<String>) -> Self {
        Self::Status {
            status,
            status_text: status_text.into(),
        }
    }
}
