//! Canonical outcome of a tool invocation.
//!
//! Every entry point (direct registry call, MCP adapter, HTTP client) reports
//! through [`InvokeResult`]. Serializing it yields the registry view
//! (`validationErrors`); the MCP and HTTP surfaces convert it into their
//! snake_case wire shape at the boundary.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::schema::ValidationIssue;

/// Error message for input schema failures.
pub const INPUT_VALIDATION_FAILED: &str = "Input validation failed";

/// Error message for output schema failures.
pub const OUTPUT_VALIDATION_FAILED: &str = "Output validation failed";

/// Why an invocation did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeFailure {
    pub error: String,
    /// Per-field issues; empty unless a schema rejected a value.
    pub validation_errors: Vec<ValidationIssue>,
}

impl InvokeFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            validation_errors: Vec::new(),
        }
    }

    pub fn with_issues(error: impl Into<String>, issues: Vec<ValidationIssue>) -> Self {
        Self {
            error: error.into(),
            validation_errors: issues,
        }
    }

    /// Failure for an unknown tool name.
    pub fn not_found(name: &str) -> Self {
        Self::new(format!("Tool \"{}\" not found", name))
    }

    pub fn input_validation(issues: Vec<ValidationIssue>) -> Self {
        Self::with_issues(INPUT_VALIDATION_FAILED, issues)
    }

    pub fn output_validation(issues: Vec<ValidationIssue>) -> Self {
        Self::with_issues(OUTPUT_VALIDATION_FAILED, issues)
    }
}

/// Outcome of invoking a tool.
#[derive(Debug, Clone, PartialEq)]
pub enum InvokeResult<T = Value> {
    Success(T),
    Failure(InvokeFailure),
}

impl<T> InvokeResult<T> {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure(InvokeFailure::new(error))
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The tool output, if the call succeeded.
    pub fn result(&self) -> Option<&T> {
        match self {
            Self::Success(result) => Some(result),
            Self::Failure(_) => None,
        }
    }

    /// The error message, if the call failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(&failure.error),
        }
    }

    /// Validation issues of a failed call (empty otherwise).
    pub fn validation_errors(&self) -> &[ValidationIssue] {
        match self {
            Self::Success(_) => &[],
            Self::Failure(failure) => failure.validation_errors.as_slice(),
        }
    }

    pub fn into_result(self) -> Result<T, InvokeFailure> {
        match self {
            Self::Success(result) => Ok(result),
            Self::Failure(failure) => Err(failure),
        }
    }
}

impl<T> From<Result<T, InvokeFailure>> for InvokeResult<T> {
    fn from(result: Result<T, InvokeFailure>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(failure) => Self::Failure(failure),
        }
    }
}

impl<T: Serialize> Serialize for InvokeResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success(result) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("ok", &true)?;
                map.serialize_entry("result", result)?;
                map.end()
            }
            Self::Failure(failure) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("ok", &false)?;
                map.serialize_entry("error", &failure.error)?;
                if !failure.validation_errors.is_empty() {
                    map.serialize_entry("validationErrors", &failure.validation_errors)?;
                }
                map.end()
            }
        }
    }
}
