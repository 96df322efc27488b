//! MCP Server implementation.
//!
//! The server handler exposes a shared [`ToolRegistry`] over the Model
//! Context Protocol. Every transport (stdio through `rmcp`, the HTTP
//! JSON-RPC endpoint and the REST endpoints) goes through the same
//! [`McpAdapter`], so a tool behaves identically wherever it is called.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use super::config::Config;
use crate::domains::tools::{InvokeOptions, McpAdapter, McpCallResult, ToolRegistry};

const INSTRUCTIONS: &str = "Tool gateway. Call tools/list to discover the registered tools and \
their input schemas; tools/call returns a JSON object with `ok`, `result`, `error` and \
`validation_errors`.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// MCP view over the tool registry.
    adapter: McpAdapter,
}

impl McpServer {
    /// Create a new server exposing `registry`.
    pub fn new(config: Config, registry: Arc<ToolRegistry>) -> Self {
        Self {
            config: Arc::new(config),
            adapter: McpAdapter::new(registry),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn adapter(&self) -> &McpAdapter {
        &self.adapter
    }

    /// Tool listing in the `rmcp` model (camelCase `inputSchema` on the wire).
    pub fn tool_list(&self) -> Vec<Tool> {
        self.adapter
            .list_tools()
            .iter()
            .map(|info| info.to_tool())
            .collect()
    }

    /// Call a tool and wrap the outcome as MCP tool content.
    ///
    /// The text content is the JSON of the [`McpCallResult`]; failures set
    /// `isError` so MCP clients surface them as tool errors.
    pub async fn call_tool_content(
        &self,
        name: &str,
        arguments: Value,
        options: InvokeOptions,
    ) -> CallToolResult {
        let outcome = self.adapter.call_tool_with(name, arguments, options).await;
        call_tool_result(&outcome)
    }
}

fn call_tool_result(outcome: &McpCallResult) -> CallToolResult {
    let text = serde_json::to_string(outcome).unwrap_or_else(|e| {
        format!(r#"{{"ok":false,"error":"Failed to encode result: {}"}}"#, e)
    });
    if outcome.ok {
        CallToolResult::success(vec![Content::text(text)])
    } else {
        CallToolResult::error(vec![Content::text(text)])
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        info!("Listing tools");
        Ok(ListToolsResult {
            tools: self.tool_list(),
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context), fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = request
            .arguments
            .map(Value::Object)
            .unwrap_or_else(|| Value::Object(Default::default()));
        Ok(self
            .call_tool_content(&request.name, arguments, InvokeOptions::default())
            .await)
    }
}
