//! Schema loading for parameter declarations.
//!
//! A schema document is a mapping with a `parameters` key holding a sequence
//! of declaration objects:
//!
//! ```yaml
//! parameters:
//!   - name: volume
//!     type: int
//!     default: 5
//!     min: 0
//!     max: 10
//!   - name: mode
//!     type: select
//!     default: auto
//!     choices: [auto, manual]
//! ```
//!
//! Sources may be an in-memory JSON value, a string in a known format, or a
//! file path ending in `.json`, `.yaml`, or `.yml`. Loading is pure apart
//! from the file read and does not validate defaults against their types;
//! that happens when a [`ParameterStore`](crate::store::ParameterStore) is
//! built from the schema.

use std::path::Path;
use std::str::FromStr;

use serde_json::Value as JsonValue;
use tracing::info;

use crate::error::ConfigFormatError;
use crate::types::{Declaration, FloatRange, IntRange, TypeTag};

/// Text format of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Json,
    Yaml,
}

/// An ordered, validated sequence of parameter declarations.
#[derive(Debug, Clone)]
pub struct Schema {
    declarations: Vec<Declaration>,
}

impl Schema {
    /// Load a schema from a file path, choosing the format by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigFormatError> {
        let path = path.as_ref();
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SchemaFormat::Json,
            Some("yaml") | Some("yml") => SchemaFormat::Yaml,
            _ => return Err(ConfigFormatError::UnsupportedExtension(path.to_path_buf())),
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let schema = Self::from_document(&text, format)?;
        info!(
            path = %path.display(),
            count = schema.declarations.len(),
            "loaded parameter schema"
        );
        Ok(schema)
    }

    /// Parse a schema from document text in the given format.
    pub fn from_document(text: &str, format: SchemaFormat) -> Result<Self, ConfigFormatError> {
        let doc: JsonValue = match format {
            SchemaFormat::Json => {
                serde_json::from_str(text).map_err(|e| ConfigFormatError::Parse(e.to_string()))?
            }
            SchemaFormat::Yaml => {
                serde_yaml::from_str(text).map_err(|e| ConfigFormatError::Parse(e.to_string()))?
            }
        };
        Self::from_value(doc)
    }

    /// Build a schema from an in-memory document.
    ///
    /// The document must be a mapping containing a `parameters` sequence.
    pub fn from_value(doc: JsonValue) -> Result<Self, ConfigFormatError> {
        let map = doc.as_object().ok_or(ConfigFormatError::NotAMapping)?;
        let entries = map
            .get("parameters")
            .ok_or(ConfigFormatError::MissingParametersKey)?
            .as_array()
            .ok_or(ConfigFormatError::ParametersNotASequence)?;

        let mut declarations: Vec<Declaration> = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let decl = parse_declaration(index, entry)?;
            if declarations.iter().any(|d| d.name == decl.name) {
                return Err(ConfigFormatError::DuplicateName(decl.name));
            }
            declarations.push(decl);
        }
        Ok(Self { declarations })
    }

    /// The declarations in schema order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub(crate) fn into_declarations(self) -> Vec<Declaration> {
        self.declarations
    }
}

fn parse_declaration(index: usize, entry: &JsonValue) -> Result<Declaration, ConfigFormatError> {
    let map = entry
        .as_object()
        .ok_or(ConfigFormatError::DeclarationNotAMapping(index))?;

    let name = map
        .get("name")
        .and_then(JsonValue::as_str)
        .ok_or(ConfigFormatError::MissingField { index, field: "name" })?;
    if !is_identifier(name) {
        return Err(ConfigFormatError::InvalidName(name.to_string()));
    }

    let tag_str = map
        .get("type")
        .and_then(JsonValue::as_str)
        .ok_or(ConfigFormatError::MissingField { index, field: "type" })?;
    let tag = TypeTag::from_str(tag_str)
        .map_err(|_| ConfigFormatError::UnknownTypeTag(tag_str.to_string()))?;

    // Defaults are carried verbatim; the store validates them on construction.
    let default = map.get("default").cloned().unwrap_or(JsonValue::Null);

    let description = map
        .get("description")
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .to_string();

    let mut decl = Declaration {
        name: name.to_string(),
        tag,
        default,
        description,
        int_range: None,
        float_range: None,
        choices: None,
    };

    let min = map.get("min");
    let max = map.get("max");
    match tag {
        TypeTag::Int => {
            if min.is_some() || max.is_some() {
                decl.int_range = Some(IntRange {
                    min: min.map(|v| parse_int_bound(name, "min", v)).transpose()?,
                    max: max.map(|v| parse_int_bound(name, "max", v)).transpose()?,
                });
            }
        }
        TypeTag::Float => {
            if min.is_some() || max.is_some() {
                decl.float_range = Some(FloatRange {
                    min: min.map(|v| parse_float_bound(name, "min", v)).transpose()?,
                    max: max.map(|v| parse_float_bound(name, "max", v)).transpose()?,
                });
            }
        }
        _ => {
            if min.is_some() || max.is_some() {
                return Err(ConfigFormatError::InvalidConstraint {
                    name: name.to_string(),
                    reason: "min/max only apply to int and float parameters".to_string(),
                });
            }
        }
    }

    match (tag, map.get("choices")) {
        (TypeTag::Select, Some(value)) => {
            let choices: Option<Vec<String>> = value.as_array().map(|items| {
                items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .unwrap_or_default()
            });
            match choices {
                Some(c) if !c.is_empty() => decl.choices = Some(c),
                _ => return Err(ConfigFormatError::MissingChoices(name.to_string())),
            }
        }
        (TypeTag::Select, None) => {
            return Err(ConfigFormatError::MissingChoices(name.to_string()));
        }
        (_, Some(_)) => {
            return Err(ConfigFormatError::InvalidConstraint {
                name: name.to_string(),
                reason: "choices only apply to select parameters".to_string(),
            });
        }
        (_, None) => {}
    }

    Ok(decl)
}

fn parse_int_bound(
    name: &str,
    field: &str,
    value: &JsonValue,
) -> Result<i64, ConfigFormatError> {
    value
        .as_i64()
        .ok_or_else(|| ConfigFormatError::InvalidConstraint {
            name: name.to_string(),
            reason: format!("'{}' must be an integer", field),
        })
}

fn parse_float_bound(
    name: &str,
    field: &str,
    value: &JsonValue,
) -> Result<f64, ConfigFormatError> {
    value
        .as_f64()
        .ok_or_else(|| ConfigFormatError::InvalidConstraint {
            name: name.to_string(),
            reason: format!("'{}' must be a number", field),
        })
}

/// Parameter names double as web route segments and accessor keys, so they
/// must be plain identifiers.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
