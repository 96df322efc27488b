//! Error types and handling for the server.
//!
//! This module defines a unified error type that can represent errors from
//! the tools domain and the transports, providing consistent error
//! handling across the entire application.

use thiserror::Error;

/// A specialized Result type for server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error raised while setting up the tool registry.
    #[error("Registry error: {0}")]
    Registry(#[from] crate::domains::tools::RegistryError),

    /// Error raised by the HTTP tool client.
    #[error("Client error: {0}")]
    Client(#[from] crate::domains::tools::ClientError),

    /// Error raised by a transport.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),
}
