//! Call logging and argument redaction.
//!
//! The registry records every completed invocation through a
//! [`ToolCallLogger`], after passing the raw arguments through a [`Redact`]
//! implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Placeholder written in place of masked values.
pub const REDACTED: &str = "[REDACTED]";

/// Key fragments masked by [`KeyRedactor::default`].
pub const DEFAULT_SENSITIVE_KEYS: &[&str] = &[
    "password",
    "secret",
    "token",
    "api_key",
    "apikey",
    "authorization",
    "cookie",
    "credential",
    "private_key",
];

// ============================================================================
// Call records
// ============================================================================

/// One logged tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRecord {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Arguments after redaction.
    pub args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ToolCallRecord {
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Sink for tool call records.
///
/// Implementations must not fail; the registry awaits the call before
/// returning the invocation result.
#[async_trait]
pub trait ToolCallLogger: Send + Sync {
    async fn log_tool_call(&self, record: ToolCallRecord);
}

/// Emits one structured `tracing` event per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingToolLogger;

#[async_trait]
impl ToolCallLogger for TracingToolLogger {
    async fn log_tool_call(&self, record: ToolCallRecord) {
        let duration_ms = record.duration_ms();
        let trace_id = record.trace_id.as_deref().unwrap_or("-");
        match &record.error {
            None => info!(
                tool = %record.name,
                duration_ms,
                trace_id,
                args = %record.args,
                "Tool call succeeded"
            ),
            Some(error) => warn!(
                tool = %record.name,
                duration_ms,
                trace_id,
                args = %record.args,
                error = %error,
                "Tool call failed"
            ),
        }
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryToolLogger {
    records: Mutex<Vec<ToolCallRecord>>,
}

impl MemoryToolLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far, oldest first.
    pub fn records(&self) -> Vec<ToolCallRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

#[async_trait]
impl ToolCallLogger for MemoryToolLogger {
    async fn log_tool_call(&self, record: ToolCallRecord) {
        self.records.lock().push(record);
    }
}

// ============================================================================
// Redaction
// ============================================================================

/// Produces a loggable copy of tool arguments.
pub trait Redact: Send + Sync {
    fn redact(&self, args: &Value) -> Value;
}

impl<F> Redact for F
where
    F: Fn(&Value) -> Value + Send + Sync,
{
    fn redact(&self, args: &Value) -> Value {
        self(args)
    }
}

/// Masks values whose object key contains a sensitive fragment.
///
/// Matching is case-insensitive and recurses through nested objects and
/// arrays.
#[derive(Debug, Clone)]
pub struct KeyRedactor {
    fragments: Vec<String>,
}

impl KeyRedactor {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            fragments: fragments
                .into_iter()
                .map(|f| f.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Default fragments plus `extra`.
    pub fn with_extra_keys<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut redactor = Self::default();
        redactor
            .fragments
            .extend(extra.into_iter().map(|f| f.as_ref().to_lowercase()));
        redactor
    }

    fn is_sensitive(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.fragments.iter().any(|f| key.contains(f.as_str()))
    }
}

impl Default for KeyRedactor {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_KEYS)
    }
}

impl Redact for KeyRedactor {
    fn redact(&self, args: &Value) -> Value {
        match args {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| {
                        let masked = if self.is_sensitive(k) {
                            Value::String(REDACTED.to_string())
                        } else {
                            self.redact(v)
                        };
                        (k.clone(), masked)
                    })
                    .collect::<Map<String, Value>>(),
            ),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.redact(v)).collect()),
            other => other.clone(),
        }
    }
}
