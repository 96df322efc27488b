//! Tools domain module.
//!
//! This module handles everything about tools: typed contracts, the registry
//! that validates and executes them, and the adapters that expose the
//! registry to other processes.
//!
//! ## Architecture
//!
//! - `schema.rs` - Validation schemas and JSON-Schema description
//! - `contract.rs` - Tool contracts (name, description, input/output schemas)
//! - `registry.rs` - Registration, lookup and the invocation pipeline
//! - `result.rs` - The canonical invocation outcome
//! - `observability.rs` - Call logging and argument redaction
//! - `mcp.rs` - MCP-shaped `list_tools` / `call_tool` adapter
//! - `client.rs` - HTTP client for a remote registry (feature `http`)
//! - `definitions/` - Built-in tools (one file per tool)
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `my_tool.rs`)
//! 2. Define params, output, `contract()`, `execute()` and `register()`
//! 3. Export it in `definitions/mod.rs` and add it to `register_builtin_tools()`

#[cfg(feature = "http")]
pub mod client;
pub mod contract;
pub mod definitions;
mod error;
pub mod mcp;
pub mod observability;
mod registry;
mod result;
pub mod schema;

#[cfg(feature = "http")]
pub use client::{HttpClientOptions, HttpToolClient};
pub use contract::{ContractInfo, ToolContract};
pub use error::{BoxError, ClientError, RegistryError};
pub use mcp::{McpAdapter, McpCallResult, McpToolInfo};
pub use observability::{
    KeyRedactor, MemoryToolLogger, Redact, ToolCallLogger, ToolCallRecord, TracingToolLogger,
};
pub use registry::{InvokeOptions, RegisteredTool, ToolMeta, ToolRegistry};
pub use result::{INPUT_VALIDATION_FAILED, InvokeFailure, InvokeResult, OUTPUT_VALIDATION_FAILED};
pub use schema::{PathSegment, Schema, SchemaRef, SchemaType, ValidationIssue, to_json_schema};
