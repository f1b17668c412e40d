//! Error types for schema loading and parameter updates.

use std::fmt;
use std::path::PathBuf;

use strum::VariantNames;

use crate::types::TypeTag;

/// Errors raised while reading or interpreting a schema document.
///
/// These are fatal at load time: a schema is either fully parsed or rejected.
#[derive(Debug)]
pub enum ConfigFormatError {
    /// Reading the schema file failed
    Io { path: PathBuf, source: std::io::Error },

    /// File extension is not one of .json, .yaml, .yml
    UnsupportedExtension(PathBuf),

    /// The document is not valid JSON/YAML
    Parse(String),

    /// The document root is not a mapping
    NotAMapping,

    /// The document has no `parameters` key
    MissingParametersKey,

    /// The `parameters` entry is not a sequence
    ParametersNotASequence,

    /// A declaration entry is not a mapping
    DeclarationNotAMapping(usize),

    /// A declaration is missing a required field
    MissingField { index: usize, field: &'static str },

    /// A parameter name is not identifier-safe
    InvalidName(String),

    /// The same parameter name is declared twice
    DuplicateName(String),

    /// The declared type is not a supported tag
    UnknownTypeTag(String),

    /// A `select` declaration has no usable `choices` list
    MissingChoices(String),

    /// A constraint field is malformed or does not apply to the type
    InvalidConstraint { name: String, reason: String },
}

impl fmt::Display for ConfigFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read schema file {:?}: {}", path, source)
            }
            Self::UnsupportedExtension(path) => write!(
                f,
                "unsupported schema file extension for {:?} (expected .json, .yaml, or .yml)",
                path
            ),
            Self::Parse(reason) => write!(f, "failed to parse schema document: {}", reason),
            Self::NotAMapping => write!(f, "schema document root must be a mapping"),
            Self::MissingParametersKey => {
                write!(f, "schema document has no 'parameters' key")
            }
            Self::ParametersNotASequence => {
                write!(f, "'parameters' must be a sequence of declarations")
            }
            Self::DeclarationNotAMapping(index) => {
                write!(f, "declaration #{} is not a mapping", index)
            }
            Self::MissingField { index, field } => {
                write!(f, "declaration #{} is missing '{}'", index, field)
            }
            Self::InvalidName(name) => write!(
                f,
                "parameter name '{}' is not identifier-safe (expected [A-Za-z_][A-Za-z0-9_]*)",
                name
            ),
            Self::DuplicateName(name) => {
                write!(f, "parameter '{}' is declared more than once", name)
            }
            Self::UnknownTypeTag(tag) => write!(
                f,
                "unknown parameter type '{}' (expected one of: {})",
                tag,
                TypeTag::VARIANTS.join(", ")
            ),
            Self::MissingChoices(name) => write!(
                f,
                "select parameter '{}' requires a non-empty 'choices' list of strings",
                name
            ),
            Self::InvalidConstraint { name, reason } => {
                write!(f, "invalid constraint on parameter '{}': {}", name, reason)
            }
        }
    }
}

impl std::error::Error for ConfigFormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A single field that failed type or constraint validation.
#[derive(Debug, Clone)]
pub struct Violation {
    pub name: String,
    pub reason: String,
}

impl Violation {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value for parameter '{}': {}", self.name, self.reason)
    }
}

/// A value failed type or constraint checks.
///
/// At store construction this aggregates every violating field; on a single
/// update it carries exactly one violation. The store's state is unchanged
/// whenever this error is returned from an update.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn single(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation::new(name, reason)],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violation in &self.violations {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Reference to a parameter name that was never declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownParameterError {
    pub name: String,
}

impl UnknownParameterError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for UnknownParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parameter '{}' is not declared", self.name)
    }
}

impl std::error::Error for UnknownParameterError {}

/// Errors returned by [`ParameterStore::set`](crate::store::ParameterStore::set).
#[derive(Debug)]
pub enum SetError {
    Validation(ValidationError),
    UnknownParameter(UnknownParameterError),
}

impl fmt::Display for SetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "{}", e),
            Self::UnknownParameter(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::UnknownParameter(e) => Some(e),
        }
    }
}

impl From<ValidationError> for SetError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<UnknownParameterError> for SetError {
    fn from(e: UnknownParameterError) -> Self {
        Self::UnknownParameter(e)
    }
}

/// Errors from the one-call constructors that both load a schema and build
/// the store.
#[derive(Debug)]
pub enum BuildError {
    Format(ConfigFormatError),
    Validation(ValidationError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(e) => write!(f, "{}", e),
            Self::Validation(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Format(e) => Some(e),
            Self::Validation(e) => Some(e),
        }
    }
}

impl From<ConfigFormatError> for BuildError {
    fn from(e: ConfigFormatError) -> Self {
        Self::Format(e)
    }
}

impl From<ValidationError> for BuildError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}
