//! Validation schemas for tool inputs and outputs.
//!
//! A [`Schema`] does two things: it validates a JSON value (returning the
//! parsed value or a list of issues), and it describes itself as a
//! JSON-Schema descriptor for discovery clients. The registry only depends on
//! the trait, so any schema library can sit behind it.
//!
//! [`SchemaType`] is the built-in implementation, assembled with the builder
//! functions in this module:
//!
//! ```rust
//! use toolgate::domains::tools::schema::{self, Schema};
//!
//! let input = schema::object([
//!     ("text", schema::string()),
//!     ("limit", schema::integer().min(1.0).optional()),
//! ]);
//!
//! assert!(input.validate(&serde_json::json!({ "text": "hi" })).is_ok());
//! assert!(input.validate(&serde_json::json!({ "limit": 0 })).is_err());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Issues
// ============================================================================

/// One step in the path to a failing value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Array index.
    Index(usize),
    /// Object property name.
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{}", i),
            Self::Key(k) => f.write_str(k),
        }
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Location of the failing value, outermost segment first.
    pub path: Vec<PathSegment>,

    /// Human-readable explanation.
    pub message: String,
}

impl ValidationIssue {
    /// Create an issue at the root of the validated value.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }

    /// Create an issue at the given path.
    pub fn at(path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    /// Prepend a segment, used when bubbling an issue out of a nested schema.
    pub fn prefixed(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return f.write_str(&self.message);
        }
        let path: Vec<String> = self.path.iter().map(ToString::to_string).collect();
        write!(f, "{}: {}", path.join("."), self.message)
    }
}

// ============================================================================
// Schema capability
// ============================================================================

/// Runtime validator plus self-description.
pub trait Schema: fmt::Debug + Send + Sync {
    /// Validate `value`, returning the parsed value on success.
    ///
    /// Parsing may normalize the value (fill defaults, drop unknown object
    /// keys). Every failing field produces its own issue.
    fn validate(&self, value: &Value) -> Result<Value, Vec<ValidationIssue>>;

    /// JSON-Schema-like descriptor of this schema.
    fn describe(&self) -> Value;

    /// Whether an object property using this schema may be absent.
    fn is_optional(&self) -> bool {
        false
    }

    /// Value substituted when an object property using this schema is absent.
    fn default_value(&self) -> Option<Value> {
        None
    }
}

/// Shared handle to a schema.
pub type SchemaRef = Arc<dyn Schema>;

/// Convert a schema into a JSON-Schema descriptor.
///
/// Purely structural; the same schema always yields the same descriptor.
pub fn to_json_schema(schema: &dyn Schema) -> Value {
    schema.describe()
}

// ============================================================================
// Built-in schema
// ============================================================================

/// Shape of a [`SchemaType`] node.
#[derive(Debug, Clone)]
pub enum Kind {
    String {
        min_len: Option<usize>,
        max_len: Option<usize>,
    },
    Number {
        integer: bool,
        min: Option<f64>,
        max: Option<f64>,
    },
    Boolean,
    Enum(Vec<String>),
    Array(Box<SchemaType>),
    Object(Vec<(String, SchemaType)>),
    Record(Box<SchemaType>),
    Optional(Box<SchemaType>),
    Default(Box<SchemaType>, Value),
    Any,
}

/// Built-in [`Schema`] implementation.
#[derive(Debug, Clone)]
pub struct SchemaType {
    kind: Kind,
    description: Option<String>,
}

pub fn string() -> SchemaType {
    SchemaType::from_kind(Kind::String {
        min_len: None,
        max_len: None,
    })
}

pub fn number() -> SchemaType {
    SchemaType::from_kind(Kind::Number {
        integer: false,
        min: None,
        max: None,
    })
}

pub fn integer() -> SchemaType {
    SchemaType::from_kind(Kind::Number {
        integer: true,
        min: None,
        max: None,
    })
}

pub fn boolean() -> SchemaType {
    SchemaType::from_kind(Kind::Boolean)
}

/// String restricted to one of `values`.
pub fn enumeration<I, S>(values: I) -> SchemaType
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SchemaType::from_kind(Kind::Enum(values.into_iter().map(Into::into).collect()))
}

pub fn array(items: SchemaType) -> SchemaType {
    SchemaType::from_kind(Kind::Array(Box::new(items)))
}

/// Object with the given properties; wrap a property in `.optional()` to make
/// it non-required.
pub fn object<I, K>(properties: I) -> SchemaType
where
    I: IntoIterator<Item = (K, SchemaType)>,
    K: Into<String>,
{
    SchemaType::from_kind(Kind::Object(
        properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
    ))
}

/// Object with arbitrary string keys and uniformly typed values.
pub fn record(values: SchemaType) -> SchemaType {
    SchemaType::from_kind(Kind::Record(Box::new(values)))
}

pub fn any() -> SchemaType {
    SchemaType::from_kind(Kind::Any)
}

impl SchemaType {
    fn from_kind(kind: Kind) -> Self {
        Self {
            kind,
            description: None,
        }
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Attach a human description, emitted in the descriptor.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Allow the value to be absent when used as an object property.
    pub fn optional(self) -> Self {
        Self::from_kind(Kind::Optional(Box::new(self)))
    }

    /// Optional property that takes `value` when absent.
    pub fn with_default(self, value: impl Into<Value>) -> Self {
        Self::from_kind(Kind::Default(Box::new(self), value.into()))
    }

    /// Minimum length for strings, minimum value for numbers.
    pub fn min(mut self, bound: f64) -> Self {
        match &mut self.kind {
            Kind::String { min_len, .. } => *min_len = Some(bound as usize),
            Kind::Number { min, .. } => *min = Some(bound),
            _ => {}
        }
        self
    }

    /// Maximum length for strings, maximum value for numbers.
    pub fn max(mut self, bound: f64) -> Self {
        match &mut self.kind {
            Kind::String { max_len, .. } => *max_len = Some(bound as usize),
            Kind::Number { max, .. } => *max = Some(bound),
            _ => {}
        }
        self
    }

    /// Wrap into a shared [`SchemaRef`].
    pub fn into_ref(self) -> SchemaRef {
        Arc::new(self)
    }

    fn validate_object(
        &self,
        properties: &[(String, SchemaType)],
        value: &Value,
    ) -> Result<Value, Vec<ValidationIssue>> {
        let Some(input) = value.as_object() else {
            return Err(vec![type_mismatch("object", value)]);
        };

        let mut parsed = Map::new();
        let mut issues = Vec::new();

        for (key, property) in properties {
            match input.get(key) {
                Some(field) => match property.validate(field) {
                    Ok(v) => {
                        parsed.insert(key.clone(), v);
                    }
                    Err(nested) => issues.extend(
                        nested
                            .into_iter()
                            .map(|i| i.prefixed(PathSegment::Key(key.clone()))),
                    ),
                },
                None => {
                    if let Some(default) = property.default_value() {
                        parsed.insert(key.clone(), default);
                    } else if !property.is_optional() {
                        issues.push(ValidationIssue::at(
                            vec![PathSegment::Key(key.clone())],
                            "Required",
                        ));
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(Value::Object(parsed))
        } else {
            Err(issues)
        }
    }
}

impl Schema for SchemaType {
    fn validate(&self, value: &Value) -> Result<Value, Vec<ValidationIssue>> {
        match &self.kind {
            Kind::String { min_len, max_len } => {
                let Some(s) = value.as_str() else {
                    return Err(vec![type_mismatch("string", value)]);
                };
                let len = s.chars().count();
                if let Some(min) = min_len.filter(|min| len < *min) {
                    return Err(vec![ValidationIssue::new(format!(
                        "String must contain at least {} character(s)",
                        min
                    ))]);
                }
                if let Some(max) = max_len.filter(|max| len > *max) {
                    return Err(vec![ValidationIssue::new(format!(
                        "String must contain at most {} character(s)",
                        max
                    ))]);
                }
                Ok(value.clone())
            }
            Kind::Number { integer, min, max } => {
                let Some(n) = value.as_f64() else {
                    let expected = if *integer { "integer" } else { "number" };
                    return Err(vec![type_mismatch(expected, value)]);
                };
                if *integer && (!n.is_finite() || n.fract() != 0.0) {
                    return Err(vec![ValidationIssue::new(
                        "Expected integer, received float",
                    )]);
                }
                if let Some(min) = min.filter(|min| n < *min) {
                    return Err(vec![ValidationIssue::new(format!(
                        "Number must be greater than or equal to {}",
                        min
                    ))]);
                }
                if let Some(max) = max.filter(|max| n > *max) {
                    return Err(vec![ValidationIssue::new(format!(
                        "Number must be less than or equal to {}",
                        max
                    ))]);
                }
                Ok(value.clone())
            }
            Kind::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                _ => Err(vec![type_mismatch("boolean", value)]),
            },
            Kind::Enum(options) => match value.as_str() {
                Some(s) if options.iter().any(|o| o == s) => Ok(value.clone()),
                Some(s) => Err(vec![ValidationIssue::new(format!(
                    "Invalid enum value. Expected {}, received '{}'",
                    quoted_options(options),
                    s
                ))]),
                None => Err(vec![type_mismatch("string", value)]),
            },
            Kind::Array(items) => {
                let Some(elements) = value.as_array() else {
                    return Err(vec![type_mismatch("array", value)]);
                };
                let mut parsed = Vec::with_capacity(elements.len());
                let mut issues = Vec::new();
                for (index, element) in elements.iter().enumerate() {
                    match items.validate(element) {
                        Ok(v) => parsed.push(v),
                        Err(nested) => issues.extend(
                            nested
                                .into_iter()
                                .map(|i| i.prefixed(PathSegment::Index(index))),
                        ),
                    }
                }
                if issues.is_empty() {
                    Ok(Value::Array(parsed))
                } else {
                    Err(issues)
                }
            }
            Kind::Object(properties) => self.validate_object(properties, value),
            Kind::Record(values) => {
                let Some(entries) = value.as_object() else {
                    return Err(vec![type_mismatch("object", value)]);
                };
                let mut parsed = Map::new();
                let mut issues = Vec::new();
                for (key, entry) in entries {
                    match values.validate(entry) {
                        Ok(v) => {
                            parsed.insert(key.clone(), v);
                        }
                        Err(nested) => issues.extend(
                            nested
                                .into_iter()
                                .map(|i| i.prefixed(PathSegment::Key(key.clone()))),
                        ),
                    }
                }
                if issues.is_empty() {
                    Ok(Value::Object(parsed))
                } else {
                    Err(issues)
                }
            }
            Kind::Optional(inner) | Kind::Default(inner, _) => inner.validate(value),
            Kind::Any => Ok(value.clone()),
        }
    }

    fn describe(&self) -> Value {
        let mut descriptor = match &self.kind {
            Kind::String { min_len, max_len } => {
                let mut d = json!({ "type": "string" });
                if let Some(min) = min_len {
                    d["minLength"] = json!(min);
                }
                if let Some(max) = max_len {
                    d["maxLength"] = json!(max);
                }
                d
            }
            Kind::Number { integer, min, max } => {
                let ty = if *integer { "integer" } else { "number" };
                let mut d = json!({ "type": ty });
                if let Some(min) = min {
                    d["minimum"] = json!(min);
                }
                if let Some(max) = max {
                    d["maximum"] = json!(max);
                }
                d
            }
            Kind::Boolean => json!({ "type": "boolean" }),
            Kind::Enum(options) => json!({ "type": "string", "enum": options }),
            Kind::Array(items) => json!({ "type": "array", "items": items.describe() }),
            Kind::Object(properties) => {
                let described: Map<String, Value> = properties
                    .iter()
                    .map(|(k, v)| (k.clone(), v.describe()))
                    .collect();
                let required: Vec<&str> = properties
                    .iter()
                    .filter(|(_, v)| !v.is_optional())
                    .map(|(k, _)| k.as_str())
                    .collect();
                json!({
                    "type": "object",
                    "properties": described,
                    "required": required,
                })
            }
            Kind::Record(values) => {
                json!({ "type": "object", "additionalProperties": values.describe() })
            }
            Kind::Optional(inner) => inner.describe(),
            Kind::Default(inner, value) => {
                let mut d = inner.describe();
                if let Value::Object(map) = &mut d {
                    map.insert("default".to_string(), value.clone());
                }
                d
            }
            Kind::Any => json!({}),
        };

        if let (Some(text), Value::Object(map)) = (&self.description, &mut descriptor) {
            map.insert("description".to_string(), Value::String(text.clone()));
        }
        descriptor
    }

    fn is_optional(&self) -> bool {
        matches!(self.kind, Kind::Optional(_) | Kind::Default(..))
    }

    fn default_value(&self) -> Option<Value> {
        match &self.kind {
            Kind::Default(_, value) => Some(value.clone()),
            _ => None,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_mismatch(expected: &str, value: &Value) -> ValidationIssue {
    ValidationIssue::new(format!(
        "Expected {}, received {}",
        expected,
        type_name(value)
    ))
}

fn quoted_options(options: &[String]) -> String {
    options
        .iter()
        .map(|o| format!("'{}'", o))
        .collect::<Vec<_>>()
        .join(" | ")
}

// ============================================================================
// Tests
// ============================================================================
