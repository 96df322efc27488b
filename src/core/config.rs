//! Configuration management for the server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables (optionally via a `.env` file) or
//! defaults.

use super::transport::TransportConfig;
use crate::domains::tools::KeyRedactor;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Remote tool client configuration.
    pub client: ClientConfig,

    /// Argument redaction for tool call logs.
    pub redaction: RedactionConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Configuration for the HTTP tool client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the remote tool server.
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,

    /// Trace id sent with every request.
    pub trace_id: Option<String>,
}

/// Configuration for argument redaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedactionConfig {
    /// Key fragments masked in addition to the built-in list.
    pub extra_keys: Vec<String>,
}

impl RedactionConfig {
    /// Build the key redactor described by this configuration.
    pub fn redactor(&self) -> KeyRedactor {
        KeyRedactor::with_extra_keys(&self.extra_keys)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_ms: 30_000,
            trace_id: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "toolgate".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            client: ClientConfig::default(),
            redaction: RedactionConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `TOOLGATE_`.
    /// For example: `TOOLGATE_SERVER_NAME`, `TOOLGATE_LOG_LEVEL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("TOOLGATE_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("TOOLGATE_LOG_LEVEL") {
            config.logging.level = level;
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        if let Ok(base_url) = std::env::var("TOOLGATE_CLIENT_BASE_URL") {
            config.client.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("TOOLGATE_CLIENT_TIMEOUT_MS") {
            match timeout.parse() {
                Ok(ms) => config.client.timeout_ms = ms,
                Err(_) => warn!(
                    "Ignoring invalid TOOLGATE_CLIENT_TIMEOUT_MS '{}', using {}ms",
                    timeout, config.client.timeout_ms
                ),
            }
        }

        if let Ok(trace_id) = std::env::var("TOOLGATE_TRACE_ID") {
            config.client.trace_id = Some(trace_id);
        }

        if let Ok(keys) = std::env::var("TOOLGATE_REDACT_KEYS") {
            config.redaction.extra_keys = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
            info!(
                "Redacting {} extra argument key(s)",
                config.redaction.extra_keys.len()
            );
        }

        config
    }
}
