//! Echo tool definition.
//!
//! Returns the input text, optionally transformed.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domains::tools::error::{BoxError, RegistryError};
use crate::domains::tools::schema;
use crate::domains::tools::{ToolContract, ToolRegistry};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Transformation applied to the echoed text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Reverse,
}

/// Parameters for the echo tool.
#[derive(Debug, Clone, Deserialize)]
pub struct EchoParams {
    /// Text to echo back.
    pub text: String,

    /// Optional transformation, `none` when absent.
    #[serde(default)]
    pub transform: Transform,
}

/// Output of the echo tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EchoOutput {
    pub text: String,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Echo tool - returns its input text.
pub struct EchoTool;

impl EchoTool {
    /// Tool name as registered.
    pub const NAME: &'static str = "echo";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Echo back the given text, optionally transformed (uppercase, lowercase or reverse).";

    pub fn contract() -> ToolContract<EchoParams, EchoOutput> {
        ToolContract::new(
            Self::NAME,
            schema::object([
                ("text", schema::string().with_description("Text to echo back")),
                (
                    "transform",
                    schema::enumeration(["none", "uppercase", "lowercase", "reverse"])
                        .with_description("Transformation to apply")
                        .optional(),
                ),
            ]),
            schema::object([("text", schema::string())]),
        )
        .with_description(Self::DESCRIPTION)
    }

    #[instrument(skip_all, fields(transform = ?params.transform))]
    pub fn execute(params: EchoParams) -> EchoOutput {
        info!("Echo tool called ({} chars)", params.text.chars().count());

        let text = match params.transform {
            Transform::None => params.text,
            Transform::Uppercase => params.text.to_uppercase(),
            Transform::Lowercase => params.text.to_lowercase(),
            Transform::Reverse => params.text.chars().rev().collect(),
        };

        EchoOutput { text }
    }

    pub fn register(registry: &ToolRegistry) -> Result<(), RegistryError> {
        registry.register_sync_tool(Self::contract(), |params| {
            Ok::<_, BoxError>(Self::execute(params))
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
