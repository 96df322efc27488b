//! MCP adapter - the registry seen through `list_tools` / `call_tool`.
//!
//! The adapter returns plain in-memory values shaped after the Model Context
//! Protocol's tool listing and tool calling conventions. It owns no transport;
//! the stdio server, the JSON-RPC endpoint and the REST endpoints all sit on
//! top of it.

use rmcp::model::Tool;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use super::registry::{InvokeOptions, RegisteredTool, ToolRegistry};
use super::result::{InvokeFailure, InvokeResult};
use super::schema::{ValidationIssue, to_json_schema};

/// Tool description for discovery clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Value,
}

impl McpToolInfo {
    fn from_tool(tool: &RegisteredTool) -> Self {
        let contract = tool.contract();
        Self {
            name: contract.name.clone(),
            description: contract.description.clone(),
            input_schema: to_json_schema(contract.input.as_ref()),
        }
    }

    /// Convert into the `rmcp` tool model.
    pub fn to_tool(&self) -> Tool {
        let input_schema = match &self.input_schema {
            Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        Tool {
            name: self.name.clone().into(),
            description: self.description.clone().map(Into::into),
            input_schema: Arc::new(input_schema),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

/// Snake_case wire view of an [`InvokeResult`].
///
/// `validation_errors` is present only when non-empty. When reading, the
/// camelCase `validationErrors` key is accepted as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpCallResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        default,
        alias = "validationErrors",
        skip_serializing_if = "Option::is_none"
    )]
    pub validation_errors: Option<Vec<ValidationIssue>>,
}

impl From<InvokeResult> for McpCallResult {
    fn from(result: InvokeResult) -> Self {
        match result {
            InvokeResult::Success(value) => Self {
                ok: true,
                result: Some(value),
                error: None,
                validation_errors: None,
            },
            InvokeResult::Failure(failure) => Self {
                ok: false,
                result: None,
                error: Some(failure.error),
                validation_errors: Some(failure.validation_errors).filter(|v| !v.is_empty()),
            },
        }
    }
}

impl From<McpCallResult> for InvokeResult {
    fn from(wire: McpCallResult) -> Self {
        if wire.ok {
            InvokeResult::Success(wire.result.unwrap_or(Value::Null))
        } else {
            InvokeResult::Failure(InvokeFailure::with_issues(
                wire.error.unwrap_or_else(|| "Unknown error".to_string()),
                wire.validation_errors.unwrap_or_default(),
            ))
        }
    }
}

/// Stateless MCP view over a shared registry.
#[derive(Clone)]
pub struct McpAdapter {
    registry: Arc<ToolRegistry>,
}

impl McpAdapter {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Every registered tool with its input schema descriptor, unsorted.
    pub fn list_tools(&self) -> Vec<McpToolInfo> {
        self.registry
            .tools()
            .iter()
            .map(|t| McpToolInfo::from_tool(t))
            .collect()
    }

    /// Describe a single tool, or `None` if it is not registered.
    pub fn get_tool_info(&self, name: &str) -> Option<McpToolInfo> {
        self.registry
            .get_tool(name)
            .map(|t| McpToolInfo::from_tool(&t))
    }

    pub async fn call_tool(&self, name: &str, input: Value) -> McpCallResult {
        self.call_tool_with(name, input, InvokeOptions::default())
            .await
    }

    /// Call a tool with explicit invocation options (trace id, skips).
    #[instrument(skip(self, input, options))]
    pub async fn call_tool_with(
        &self,
        name: &str,
        input: Value,
        options: InvokeOptions,
    ) -> McpCallResult {
        info!("MCP call_tool: {}", name);
        self.registry
            .invoke_tool(name, input, options)
            .await
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::contract::ToolContract;
    use crate::domains::tools::error::BoxError;
    use crate::domains::tools::schema;
    use serde_json::json;

    fn adapter() -> McpAdapter {
        let registry = Arc::new(ToolRegistry::new());
        registry
            .register_sync_tool(
                ToolContract::<Value, Value>::new(
                    "lookup",
                    schema::object([
                        ("id", schema::integer()),
                        ("tags", schema::array(schema::string()).optional()),
                    ]),
                    schema::any(),
                )
                .with_description("Find a record"),
                |input: Value| Ok::<_, BoxError>(json!({ "found": input["id"] })),
            )
            .unwrap();
        McpAdapter::new(registry)
    }

    #[test]
    fn test_list_tools_includes_schema() {
        let tools = adapter().list_tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "lookup");
        assert_eq!(tools[0].description.as_deref(), Some("Find a record"));
        assert_eq!(tools[0].input_schema["required"], json!(["id"]));
    }

    #[test]
    fn test_get_tool_info() {
        let adapter = adapter();
        assert_eq!(adapter.get_tool_info("lookup"), adapter.list_tools().pop());
        assert!(adapter.get_tool_info("missing").is_none());
    }

    #[tokio::test]
    async fn test_call_tool_success() {
        let result = adapter().call_tool("lookup", json!({ "id": 7 })).await;
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "ok": true, "result": { "found": 7 } })
        );
    }

    #[tokio::test]
    async fn test_call_tool_uses_snake_case_issues() {
        let result = adapter()
            .call_tool("lookup", json!({ "id": "x", "tags": ["a", 3] }))
            .await;

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "ok": false,
                "error": "Input validation failed",
                "validation_errors": [
                    { "path": ["id"], "message": "Expected integer, received string" },
                    { "path": ["tags", 1], "message": "Expected string, received number" }
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_call_tool_not_found_omits_issues() {
        let result = adapter().call_tool("missing", json!({})).await;
        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("Tool \"missing\" not found"));
        assert!(result.validation_errors.is_none());
    }

    #[test]
    fn test_wire_view_accepts_camel_case() {
        let wire: McpCallResult = serde_json::from_value(json!({
            "ok": false,
            "error": "Input validation failed",
            "validationErrors": [{ "path": ["a"], "message": "Required" }]
        }))
        .unwrap();
        let result: InvokeResult = wire.into();
        assert_eq!(result.validation_errors().len(), 1);
    }

    #[test]
    fn test_to_rmcp_tool() {
        let info = adapter().get_tool_info("lookup").unwrap();
        let tool = info.to_tool();
        assert_eq!(tool.name, "lookup");
        assert_eq!(tool.input_schema.get("type"), Some(&json!("object")));
    }
}
