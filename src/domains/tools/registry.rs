//! Tool Registry - registration, lookup and invocation of tools.
//!
//! This module provides:
//! - A registry mapping tool names to contract + implementation pairs
//! - The invocation pipeline (validate input, execute, validate output, log)
//! - Tool metadata for listing
//!
//! The registry is an explicit value owned by the application's composition
//! root and shared by `Arc` with every adapter. Independent registries can
//! coexist, which keeps tests isolated.

use chrono::Utc;
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::contract::{ContractInfo, ToolContract};
use super::error::{BoxError, RegistryError};
use super::observability::{KeyRedactor, Redact, ToolCallLogger, ToolCallRecord, TracingToolLogger};
use super::result::{InvokeFailure, InvokeResult};
use super::schema::ValidationIssue;

// ============================================================================
// Registered tools
// ============================================================================

/// Why the type-erased handler could not produce a JSON output.
enum HandlerError {
    /// The validated input did not deserialize into the implementation's type.
    Decode(String),
    /// The implementation's output did not serialize to JSON.
    Encode(String),
    /// The implementation returned an error.
    Failed(String),
}

type Handler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, HandlerError>> + Send + Sync>;

/// A contract paired with its implementation.
pub struct RegisteredTool {
    contract: ContractInfo,
    handler: Handler,
}

impl RegisteredTool {
    pub fn name(&self) -> &str {
        &self.contract.name
    }

    pub fn contract(&self) -> &ContractInfo {
        &self.contract
    }

    pub fn meta(&self) -> ToolMeta {
        ToolMeta {
            name: self.contract.name.clone(),
            description: self.contract.description.clone(),
        }
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("contract", &self.contract)
            .finish_non_exhaustive()
    }
}

/// Listing projection of a registered tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Per-call switches for [`ToolRegistry::invoke_tool`].
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    /// Pass the raw input to the implementation without schema validation.
    pub skip_input_validation: bool,

    /// Return the implementation's output without schema validation.
    pub skip_output_validation: bool,

    /// Correlation id copied into the call log entry.
    pub trace_id: Option<String>,
}

impl InvokeOptions {
    pub fn with_trace_id(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: Some(trace_id.into()),
            ..Default::default()
        }
    }
}

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - the single source of truth for which tools exist.
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<RegisteredTool>>>,
    logger: Arc<dyn ToolCallLogger>,
    redactor: Arc<dyn Redact>,
}

impl ToolRegistry {
    /// Create an empty registry logging through `tracing` with the default
    /// key redactor.
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
            logger: Arc::new(TracingToolLogger),
            redactor: Arc::new(KeyRedactor::default()),
        }
    }

    /// Replace the call logger.
    pub fn with_logger(mut self, logger: Arc<dyn ToolCallLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Replace the argument redactor.
    pub fn with_redactor(mut self, redactor: Arc<dyn Redact>) -> Self {
        self.redactor = redactor;
        self
    }

    /// Register an asynchronous implementation under the contract's name.
    ///
    /// Fails if the name is already taken; the existing registration is kept.
    /// Use [`has_tool`](Self::has_tool) first for conditional registration.
    pub fn register_tool<I, O, F, Fut, E>(
        &self,
        contract: ToolContract<I, O>,
        implementation: F,
    ) -> Result<(), RegistryError>
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let handler: Handler = Arc::new(move |input: Value| {
            match serde_json::from_value::<I>(input) {
                Ok(typed) => {
                    let pending = implementation(typed);
                    async move {
                        match pending.await {
                            Ok(output) => serde_json::to_value(output)
                                .map_err(|e| HandlerError::Encode(e.to_string())),
                            Err(e) => {
                                let error: BoxError = e.into();
                                Err(HandlerError::Failed(error.to_string()))
                            }
                        }
                    }
                    .boxed()
                }
                Err(e) => futures::future::ready(Err(HandlerError::Decode(e.to_string()))).boxed(),
            }
        });

        self.insert(RegisteredTool {
            contract: contract.into_info(),
            handler,
        })
    }

    /// Register a synchronous implementation under the contract's name.
    pub fn register_sync_tool<I, O, F, E>(
        &self,
        contract: ToolContract<I, O>,
        implementation: F,
    ) -> Result<(), RegistryError>
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(I) -> Result<O, E> + Send + Sync + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        self.register_tool(contract, move |input| {
            futures::future::ready(implementation(input))
        })
    }

    fn insert(&self, tool: RegisteredTool) -> Result<(), RegistryError> {
        let mut tools = self.tools.write();
        match tools.entry(tool.contract.name.clone()) {
            Entry::Occupied(entry) => {
                warn!("Duplicate tool registration: {}", entry.key());
                Err(RegistryError::duplicate(entry.key().clone()))
            }
            Entry::Vacant(entry) => {
                debug!("Registered tool: {}", entry.key());
                entry.insert(Arc::new(tool));
                Ok(())
            }
        }
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.read().contains_key(name)
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<RegisteredTool>> {
        self.tools.read().get(name).cloned()
    }

    /// Every registered tool exactly once, in no particular order.
    pub fn list_tools(&self) -> Vec<ToolMeta> {
        self.tools.read().values().map(|t| t.meta()).collect()
    }

    /// Snapshot of all registered tools, in no particular order.
    pub fn tools(&self) -> Vec<Arc<RegisteredTool>> {
        self.tools.read().values().cloned().collect()
    }

    pub fn tool_count(&self) -> usize {
        self.tools.read().len()
    }

    /// Remove every tool.
    ///
    /// Meant for test isolation; calling it while requests are in flight
    /// makes every tool unreachable.
    pub fn clear(&self) {
        self.tools.write().clear();
    }

    /// Invoke a tool by name.
    ///
    /// Never fails at the Rust level: unknown tools, schema violations,
    /// implementation errors and panics are all reported in the returned
    /// [`InvokeResult`]. Every call on a known tool produces exactly one log
    /// entry; unknown tools are not logged.
    #[instrument(skip(self, input, options), fields(trace_id = options.trace_id.as_deref()))]
    pub async fn invoke_tool(&self, name: &str, input: Value, options: InvokeOptions) -> InvokeResult {
        let Some(tool) = self.get_tool(name) else {
            warn!("Unknown tool requested: {}", name);
            return InvokeResult::Failure(InvokeFailure::not_found(name));
        };

        let started_at = Utc::now();
        let outcome = Self::run(&tool, &input, &options).await;
        let finished_at = Utc::now();

        self.logger
            .log_tool_call(ToolCallRecord {
                name: tool.contract.name.clone(),
                started_at,
                finished_at,
                error: outcome.as_ref().err().map(|f| f.error.clone()),
                args: self.redactor.redact(&input),
                trace_id: options.trace_id.clone(),
            })
            .await;

        outcome.into()
    }

    async fn run(
        tool: &RegisteredTool,
        input: &Value,
        options: &InvokeOptions,
    ) -> Result<Value, InvokeFailure> {
        let parsed = if options.skip_input_validation {
            input.clone()
        } else {
            tool.contract
                .input
                .validate(input)
                .map_err(InvokeFailure::input_validation)?
        };

        let executed = AssertUnwindSafe(async { (tool.handler)(parsed).await })
            .catch_unwind()
            .await;

        let output = match executed {
            Ok(Ok(output)) => output,
            Ok(Err(HandlerError::Decode(message))) => {
                return Err(InvokeFailure::input_validation(vec![ValidationIssue::new(
                    message,
                )]));
            }
            Ok(Err(HandlerError::Encode(message))) => {
                return Err(InvokeFailure::output_validation(vec![ValidationIssue::new(
                    message,
                )]));
            }
            Ok(Err(HandlerError::Failed(message))) => return Err(InvokeFailure::new(message)),
            Err(panic) => return Err(InvokeFailure::new(panic_message(panic.as_ref()))),
        };

        if !options.skip_output_validation {
            tool.contract
                .output
                .validate(&output)
                .map_err(InvokeFailure::output_validation)?;
        }

        Ok(output)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "tool panicked".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::observability::{MemoryToolLogger, REDACTED};
    use crate::domains::tools::result::{INPUT_VALIDATION_FAILED, OUTPUT_VALIDATION_FAILED};
    use crate::domains::tools::schema::{self, PathSegment};
    use serde_json::json;
    use std::time::Duration;

    #[derive(Debug, Deserialize)]
    struct AddInput {
        a: f64,
        b: f64,
    }

    #[derive(Debug, Serialize)]
    struct AddOutput {
        sum: f64,
    }

    fn add_contract() -> ToolContract<AddInput, AddOutput> {
        ToolContract::new(
            "math.add",
            schema::object([("a", schema::number()), ("b", schema::number())]),
            schema::object([("sum", schema::number())]),
        )
        .with_description("Add two numbers")
    }

    fn raw_contract(name: &str) -> ToolContract<Value, Value> {
        ToolContract::new(
            name,
            schema::object([("token", schema::string().optional())]),
            schema::object([("value", schema::integer())]),
        )
    }

    fn registry_with_logger() -> (ToolRegistry, Arc<MemoryToolLogger>) {
        let logger = Arc::new(MemoryToolLogger::new());
        let registry = ToolRegistry::new().with_logger(logger.clone());
        (registry, logger)
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ToolRegistry::new();
        let contract = add_contract();
        let info = contract.info().clone();

        registry
            .register_sync_tool(contract, |i: AddInput| {
                Ok::<_, BoxError>(AddOutput { sum: i.a + i.b })
            })
            .unwrap();

        assert!(registry.has_tool("math.add"));
        assert!(!registry.has_tool("math.sub"));
        assert_eq!(registry.tool_count(), 1);
        let tool = registry.get_tool("math.add").unwrap();
        assert_eq!(tool.contract(), &info);
        assert_eq!(
            registry.list_tools(),
            vec![ToolMeta {
                name: "math.add".to_string(),
                description: Some("Add two numbers".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_duplicate_registration_keeps_first() {
        let registry = ToolRegistry::new();
        registry
            .register_sync_tool(raw_contract("dup"), |_: Value| {
                Ok::<_, BoxError>(json!({ "value": 1 }))
            })
            .unwrap();

        let err = registry
            .register_sync_tool(raw_contract("dup"), |_: Value| {
                Ok::<_, BoxError>(json!({ "value": 2 }))
            })
            .unwrap_err();

        assert_eq!(err, RegistryError::DuplicateTool("dup".to_string()));
        assert_eq!(err.to_string(), "Tool \"dup\" is already registered");
        assert_eq!(registry.tool_count(), 1);

        let result = registry.invoke_tool("dup", json!({}), InvokeOptions::default()).await;
        assert_eq!(result, InvokeResult::Success(json!({ "value": 1 })));
    }

    #[tokio::test]
    async fn test_invoke_success_logs_once() {
        let (registry, logger) = registry_with_logger();
        registry
            .register_tool(add_contract(), |i: AddInput| async move {
                Ok::<_, BoxError>(AddOutput { sum: i.a + i.b })
            })
            .unwrap();

        let result = registry
            .invoke_tool(
                "math.add",
                json!({ "a": 5, "b": 3 }),
                InvokeOptions::with_trace_id("trace-7"),
            )
            .await;

        assert_eq!(result, InvokeResult::Success(json!({ "sum": 8.0 })));
        let records = logger.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "math.add");
        assert_eq!(records[0].error, None);
        assert_eq!(records[0].trace_id.as_deref(), Some("trace-7"));
        assert_eq!(records[0].args, json!({ "a": 5, "b": 3 }));
        assert!(records[0].finished_at >= records[0].started_at);
    }

    #[tokio::test]
    async fn test_invoke_input_validation_failure() {
        let (registry, logger) = registry_with_logger();
        registry
            .register_sync_tool(add_contract(), |i: AddInput| {
                Ok::<_, BoxError>(AddOutput { sum: i.a + i.b })
            })
            .unwrap();

        let result = registry
            .invoke_tool("math.add", json!({ "a": "five", "b": 3 }), InvokeOptions::default())
            .await;

        assert_eq!(result.error(), Some(INPUT_VALIDATION_FAILED));
        assert_eq!(result.validation_errors().len(), 1);
        assert_eq!(result.validation_errors()[0].path, vec![PathSegment::from("a")]);

        let records = logger.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].error.as_deref(), Some(INPUT_VALIDATION_FAILED));
    }

    #[tokio::test]
    async fn test_invoke_not_found_is_not_logged() {
        let (registry, logger) = registry_with_logger();
        registry
            .register_sync_tool(add_contract(), |i: AddInput| {
                Ok::<_, BoxError>(AddOutput { sum: i.a + i.b })
            })
            .unwrap();

        let result = registry
            .invoke_tool("nonexistent", json!({ "anything": true }), InvokeOptions::default())
            .await;

        assert_eq!(result.error(), Some("Tool \"nonexistent\" not found"));
        assert!(result.validation_errors().is_empty());
        assert!(logger.is_empty());
    }

    #[tokio::test]
    async fn test_invoke_output_validation_failure() {
        let (registry, logger) = registry_with_logger();
        registry
            .register_sync_tool(raw_contract("broken"), |_: Value| {
                Ok::<_, BoxError>(json!({ "value": "not a number" }))
            })
            .unwrap();

        let result = registry
            .invoke_tool("broken", json!({}), InvokeOptions::default())
            .await;

        assert_eq!(result.error(), Some(OUTPUT_VALIDATION_FAILED));
        assert_eq!(result.validation_errors()[0].path, vec![PathSegment::from("value")]);
        assert_eq!(logger.records()[0].error.as_deref(), Some(OUTPUT_VALIDATION_FAILED));

        let unchecked = registry
            .invoke_tool(
                "broken",
                json!({}),
                InvokeOptions {
                    skip_output_validation: true,
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(unchecked, InvokeResult::Success(json!({ "value": "not a number" })));
    }

    #[tokio::test]
    async fn test_skip_input_validation_passes_raw_input() {
        let registry = ToolRegistry::new();
        registry
            .register_sync_tool(raw_contract("raw"), |input: Value| {
                Ok::<_, BoxError>(json!({ "value": input["n"].as_i64().unwrap_or(-1) }))
            })
            .unwrap();

        // The input schema strips unknown keys, so `n` only survives unvalidated.
        let validated = registry.invoke_tool("raw", json!({ "n": 4 }), InvokeOptions::default()).await;
        assert_eq!(validated, InvokeResult::Success(json!({ "value": -1 })));

        let raw = registry
            .invoke_tool(
                "raw",
                json!({ "n": 4 }),
                InvokeOptions {
                    skip_input_validation: true,
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(raw, InvokeResult::Success(json!({ "value": 4 })));
    }

    #[tokio::test]
    async fn test_implementation_error_is_reported() {
        let (registry, logger) = registry_with_logger();
        registry
            .register_tool(raw_contract("fails"), |_: Value| async {
                Err::<Value, _>("database unavailable")
            })
            .unwrap();

        let result = registry.invoke_tool("fails", json!({}), InvokeOptions::default()).await;

        assert_eq!(result.error(), Some("database unavailable"));
        assert!(result.validation_errors().is_empty());
        assert_eq!(logger.records()[0].error.as_deref(), Some("database unavailable"));
    }

    #[tokio::test]
    async fn test_panicking_implementation_is_caught() {
        let (registry, logger) = registry_with_logger();
        registry
            .register_sync_tool(raw_contract("panics"), |_: Value| -> Result<Value, BoxError> {
                panic!("boom")
            })
            .unwrap();

        let result = registry.invoke_tool("panics", json!({}), InvokeOptions::default()).await;

        assert_eq!(result.error(), Some("boom"));
        assert_eq!(logger.len(), 1);
    }

    #[tokio::test]
    async fn test_logged_args_are_redacted() {
        let (registry, logger) = registry_with_logger();
        registry
            .register_sync_tool(raw_contract("secretive"), |_: Value| {
                Ok::<_, BoxError>(json!({ "value": 1 }))
            })
            .unwrap();

        registry
            .invoke_tool("secretive", json!({ "token": "s3cr3t" }), InvokeOptions::default())
            .await;

        assert_eq!(logger.records()[0].args, json!({ "token": REDACTED }));
    }

    #[tokio::test]
    async fn test_custom_redactor() {
        let logger = Arc::new(MemoryToolLogger::new());
        let registry = ToolRegistry::new()
            .with_logger(logger.clone())
            .with_redactor(Arc::new(|_: &Value| json!("<omitted>")));
        registry
            .register_sync_tool(raw_contract("quiet"), |_: Value| {
                Ok::<_, BoxError>(json!({ "value": 1 }))
            })
            .unwrap();

        registry.invoke_tool("quiet", json!({}), InvokeOptions::default()).await;

        assert_eq!(logger.records()[0].args, json!("<omitted>"));
    }

    #[tokio::test]
    async fn test_concurrent_invocations_are_independent() {
        let registry = Arc::new(ToolRegistry::new());
        registry
            .register_tool(add_contract(), |i: AddInput| async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok::<_, BoxError>(AddOutput { sum: i.a + i.b })
            })
            .unwrap();

        let calls = (0..8).map(|n| {
            let registry = registry.clone();
            async move {
                registry
                    .invoke_tool("math.add", json!({ "a": n, "b": 1 }), InvokeOptions::default())
                    .await
            }
        });
        let results = futures::future::join_all(calls).await;

        for (n, result) in results.into_iter().enumerate() {
            assert_eq!(result, InvokeResult::Success(json!({ "sum": n as f64 + 1.0 })));
        }
    }

    #[test]
    fn test_clear_empties_registry() {
        let registry = ToolRegistry::new();
        registry
            .register_sync_tool(raw_contract("a"), |_: Value| Ok::<_, BoxError>(json!({ "value": 1 })))
            .unwrap();
        registry
            .register_sync_tool(raw_contract("b"), |_: Value| Ok::<_, BoxError>(json!({ "value": 2 })))
            .unwrap();
        assert_eq!(registry.tool_count(), 2);

        registry.clear();
        assert_eq!(registry.tool_count(), 0);
        assert!(registry.list_tools().is_empty());

        let result = tokio_test::block_on(registry.invoke_tool("a", json!({}), InvokeOptions::default()));
        assert_eq!(result.error(), Some("Tool \"a\" not found"));
    }
}
