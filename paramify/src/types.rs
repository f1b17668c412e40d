//! Parameter types and declarations.
//!
//! These types form the schema vocabulary: a [`Declaration`] describes one
//! parameter (name, type tag, default, constraints), and a [`ParamValue`]
//! holds one live value. Type tags are a closed set; tag strings from schema
//! documents are mapped through [`TypeTag`] and never evaluated as code.

use serde::Serialize;
use serde_json::Value as JsonValue;

/// The closed set of supported parameter kinds.
///
/// `select` is a string validated against a declared choice set; `text` is a
/// multiline string with no length cap (it only differs from `str` for
/// schema-driven editors).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Bool,
    Int,
    Float,
    Str,
    Select,
    List,
    Text,
}

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// Name of the value's shape, used in violation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
        }
    }

    /// Convert an untyped JSON/YAML value into a parameter value.
    ///
    /// Integers become `Int`, other numbers `Float`, arrays are converted
    /// element-wise. Nulls and nested mappings are not parameter values.
    pub fn from_json(value: &JsonValue) -> Result<Self, String> {
        match value {
            JsonValue::Bool(b) => Ok(Self::Bool(*b)),
            JsonValue::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .ok_or_else(|| format!("number {} is not representable", n)),
            JsonValue::String(s) => Ok(Self::Str(s.clone())),
            JsonValue::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            JsonValue::Null => Err("null is not a parameter value".to_string()),
            JsonValue::Object(_) => Err("mappings are not supported as parameter values".to_string()),
        }
    }

    /// Convert to a JSON value for snapshots and wire bodies.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Bool(b) => JsonValue::from(*b),
            Self::Int(v) => JsonValue::from(*v),
            Self::Float(v) => JsonValue::from(*v),
            Self::Str(s) => JsonValue::from(s.clone()),
            Self::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(v: Vec<ParamValue>) -> Self {
        Self::List(v)
    }
}

/// Inclusive bounds for an `int` parameter.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IntRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

/// Inclusive bounds for a `float` parameter.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FloatRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// One parameter declaration: name, type, default, and constraints.
///
/// Declarations are produced by schema loading and immutable thereafter.
/// At most one of `int_range`/`float_range` is set, matching the type tag;
/// `choices` is present exactly for `select` parameters.
#[derive(Debug, Clone, Serialize)]
pub struct Declaration {
    pub name: String,
    #[serde(rename = "type")]
    pub tag: TypeTag,
    pub default: JsonValue,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(flatten)]
    pub int_range: Option<IntRange>,
    #[serde(flatten)]
    pub float_range: Option<FloatRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
}

impl Declaration {
    /// Create an unconstrained declaration.
    pub fn new(name: impl Into<String>, tag: TypeTag, default: JsonValue) -> Self {
        Self {
            name: name.into(),
            tag,
            default,
            description: String::new(),
            int_range: None,
            float_range: None,
            choices: None,
        }
    }
}
