//! Toolgate - typed tool contracts behind a validating registry.
//!
//! Tools are declared as contracts (name, description, input and output
//! schemas) and registered with an implementation. The registry validates
//! every call on the way in and on the way out, logs it with redacted
//! arguments, and never lets a tool failure escape as a panic or error:
//! every invocation ends in an [`InvokeResult`](domains::tools::InvokeResult).
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the MCP server handler and transports
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: schemas, contracts, the registry, the MCP adapter and the HTTP client
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use toolgate::core::{Config, McpServer, TransportService};
//! use toolgate::domains::tools::{ToolRegistry, definitions::register_builtin_tools};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let registry = Arc::new(ToolRegistry::new().with_redactor(Arc::new(config.redaction.redactor())));
//!     register_builtin_tools(&registry)?;
//!     let transport = TransportService::new(config.transport.clone());
//!     transport.run(McpServer::new(config, registry)).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
pub use domains::tools::{InvokeResult, ToolContract, ToolRegistry};
