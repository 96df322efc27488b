//! Addition tool definition.

use serde::{Deserialize, Serialize, Serializer};
use tracing::{info, instrument};

use crate::domains::tools::error::{BoxError, RegistryError};
use crate::domains::tools::schema;
use crate::domains::tools::{ToolContract, ToolRegistry};

/// Parameters for the addition tool.
#[derive(Debug, Clone, Deserialize)]
pub struct MathAddParams {
    pub a: f64,
    pub b: f64,
}

/// Output of the addition tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MathAddOutput {
    #[serde(serialize_with = "whole_as_integer")]
    pub sum: f64,
}

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Write whole sums as JSON integers (`8`, not `8.0`).
fn whole_as_integer<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Addition tool - adds two numbers.
pub struct MathAddTool;

impl MathAddTool {
    pub const NAME: &'static str = "math.add";

    pub const DESCRIPTION: &'static str = "Add two numbers and return their sum.";

    pub fn contract() -> ToolContract<MathAddParams, MathAddOutput> {
        ToolContract::new(
            Self::NAME,
            schema::object([
                ("a", schema::number().with_description("First addend")),
                ("b", schema::number().with_description("Second addend")),
            ]),
            schema::object([("sum", schema::number())]),
        )
        .with_description(Self::DESCRIPTION)
    }

    #[instrument(skip_all, fields(a = params.a, b = params.b))]
    pub fn execute(params: MathAddParams) -> MathAddOutput {
        info!("Addition tool called");
        MathAddOutput {
            sum: params.a + params.b,
        }
    }

    pub fn register(registry: &ToolRegistry) -> Result<(), RegistryError> {
        registry.register_sync_tool(Self::contract(), |params| {
            Ok::<_, BoxError>(Self::execute(params))
        })
    }
}
