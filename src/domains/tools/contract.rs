//! Tool contracts.
//!
//! A contract names a tool, describes it, and carries the schemas that guard
//! its input and output. It is plain data: the registry pairs it with an
//! implementation, and discovery surfaces read it without executing anything.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::schema::{Schema, SchemaRef};

/// Untyped view of a contract, as stored in the registry.
#[derive(Clone)]
pub struct ContractInfo {
    pub name: String,
    pub description: Option<String>,
    pub input: SchemaRef,
    pub output: SchemaRef,
}

impl fmt::Debug for ContractInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractInfo")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Two views are equal when they were built from the same contract: same
/// name and description, and the very same schema instances.
impl PartialEq for ContractInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && Arc::ptr_eq(&self.input, &other.input)
            && Arc::ptr_eq(&self.output, &other.output)
    }
}

/// Typed tool contract.
///
/// `I` is what the implementation receives once the input schema accepted
/// the raw arguments; `O` is what it returns before the output schema checks
/// it.
pub struct ToolContract<I, O> {
    info: ContractInfo,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O> ToolContract<I, O>
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    /// Define a contract. `name` must be non-empty and is the registry key.
    pub fn new(
        name: impl Into<String>,
        input: impl Schema + 'static,
        output: impl Schema + 'static,
    ) -> Self {
        Self::from_refs(name, Arc::new(input), Arc::new(output))
    }

    /// Define a contract around already-shared schemas.
    pub fn from_refs(name: impl Into<String>, input: SchemaRef, output: SchemaRef) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "tool name must not be empty");
        Self {
            info: ContractInfo {
                name,
                description: None,
                input,
                output,
            },
            _types: PhantomData,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.info.description = Some(description.into());
        self
    }
}

impl<I, O> ToolContract<I, O> {
    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn description(&self) -> Option<&str> {
        self.info.description.as_deref()
    }

    pub fn info(&self) -> &ContractInfo {
        &self.info
    }

    pub fn into_info(self) -> ContractInfo {
        self.info
    }
}

impl<I, O> Clone for ToolContract<I, O> {
    fn clone(&self) -> Self {
        Self {
            info: self.info.clone(),
            _types: PhantomData,
        }
    }
}

impl<I, O> fmt::Debug for ToolContract<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ToolContract").field(&self.info).finish()
    }
}
