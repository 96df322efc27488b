//! Built-in tool definitions.
//!
//! Each tool is defined in its own file and knows how to register itself.

pub mod echo;
pub mod math_add;

pub use echo::{EchoOutput, EchoParams, EchoTool, Transform};
pub use math_add::{MathAddOutput, MathAddParams, MathAddTool};

use super::ToolRegistry;
use super::error::RegistryError;

/// Register every built-in tool.
///
/// When adding a new tool, add it here.
pub fn register_builtin_tools(registry: &ToolRegistry) -> Result<(), RegistryError> {
    EchoTool::register(registry)?;
    MathAddTool::register(registry)?;
    Ok(())
}

/// Names of the built-in tools.
pub fn builtin_tool_names() -> Vec<&'static str> {
    vec![EchoTool::NAME, MathAddTool::NAME]
}
