//! Parameter storage with validation and change notification.
//!
//! [`ParameterStore`] holds the live record for one schema. Every update
//! builds a full candidate record, validates it, and swaps it in whole, so a
//! failed update never leaves partially-mutated state and no invalid record
//! is ever observable. Registered per-parameter hooks run synchronously
//! after the swap.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{
    BuildError, SetError, UnknownParameterError, ValidationError, Violation,
};
use crate::schema::Schema;
use crate::types::{Declaration, ParamValue, TypeTag};

type SetHook = Arc<dyn Fn(&ParamValue) + Send + Sync>;

/// The live typed record: one value per declaration, index-aligned with the
/// declaration list. Replaced wholesale on every successful update.
#[derive(Debug, Clone, PartialEq)]
struct ParameterRecord {
    values: Vec<ParamValue>,
}

/// A validated, mutable parameter store built from a schema.
///
/// The store is synchronous and does no internal locking; embedders that
/// share it across threads must serialize writes (see `paramify-web` for the
/// lock-per-store pattern).
pub struct ParameterStore {
    declarations: Vec<Declaration>,
    index: HashMap<String, usize>,
    record: ParameterRecord,
    hooks: HashMap<String, SetHook>,
}

impl std::fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterStore")
            .field("declarations", &self.declarations)
            .field("record", &self.record)
            .field("hooks", &self.hooks.keys())
            .finish()
    }
}

impl ParameterStore {
    /// Build a store from a schema, instantiating every declaration's
    /// default and validating the whole record.
    ///
    /// Fails with a [`ValidationError`] listing **every** violating field;
    /// a store is either fully valid or never constructed.
    pub fn new(schema: Schema) -> Result<Self, ValidationError> {
        let declarations = schema.into_declarations();

        let mut values = Vec::with_capacity(declarations.len());
        let mut violations = Vec::new();
        for decl in &declarations {
            match ParamValue::from_json(&decl.default)
                .and_then(|value| conform_value(value, decl))
            {
                Ok(value) => values.push(value),
                Err(reason) => violations.push(Violation::new(&decl.name, reason)),
            }
        }
        if !violations.is_empty() {
            return Err(ValidationError::new(violations));
        }

        let index = declarations
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();

        Ok(Self {
            declarations,
            index,
            record: ParameterRecord { values },
            hooks: HashMap::new(),
        })
    }

    /// Load a schema file and build a store from it in one call.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        Ok(Self::new(Schema::from_path(path)?)?)
    }

    /// Build a store from an in-memory schema document.
    pub fn from_value(doc: JsonValue) -> Result<Self, BuildError> {
        Ok(Self::new(Schema::from_value(doc)?)?)
    }

    /// The declarations in schema order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Current value of a single parameter.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.index.get(name).map(|&i| &self.record.values[i])
    }

    /// Owned snapshot of all current values.
    ///
    /// The snapshot is a copy; mutating it never affects the store.
    pub fn get_parameters(&self) -> HashMap<String, ParamValue> {
        self.declarations
            .iter()
            .zip(&self.record.values)
            .map(|(decl, value)| (decl.name.clone(), value.clone()))
            .collect()
    }

    /// JSON snapshot in declaration order, for wire serialization.
    pub fn snapshot_json(&self) -> JsonValue {
        let mut map = serde_json::Map::with_capacity(self.declarations.len());
        for (decl, value) in self.declarations.iter().zip(&self.record.values) {
            map.insert(decl.name.clone(), value.to_json());
        }
        JsonValue::Object(map)
    }

    /// Update one parameter.
    ///
    /// A candidate record is built from the current values with `name`
    /// overwritten, validated in full, and swapped in atomically. On any
    /// failure the old record stays authoritative. On success the hook
    /// registered for `name` (if any) runs synchronously with the new value;
    /// a panicking hook propagates to the caller, but the swap has already
    /// happened.
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<(), SetError> {
        let idx = *self
            .index
            .get(name)
            .ok_or_else(|| UnknownParameterError::new(name))?;

        let mut candidate = self.record.clone();
        candidate.values[idx] = value.into();
        let candidate = conform_record(&self.declarations, candidate)?;

        self.record = candidate;
        debug!(parameter = name, value = ?self.record.values[idx], "parameter updated");

        if let Some(hook) = self.hooks.get(name).cloned() {
            hook(&self.record.values[idx]);
        }
        Ok(())
    }

    /// Update one parameter from an untyped JSON value.
    pub fn set_json(&mut self, name: &str, value: &JsonValue) -> Result<(), SetError> {
        if !self.index.contains_key(name) {
            return Err(UnknownParameterError::new(name).into());
        }
        let value = ParamValue::from_json(value)
            .map_err(|reason| ValidationError::single(name, reason))?;
        self.set(name, value)
    }

    /// Register the change hook for `name`, replacing any previous one.
    ///
    /// The hook runs after each successful update of that parameter, with
    /// the new value. Unregistered parameters default to no notification.
    pub fn on_set<F>(&mut self, name: &str, hook: F) -> Result<(), UnknownParameterError>
    where
        F: Fn(&ParamValue) + Send + Sync + 'static,
    {
        if !self.index.contains_key(name) {
            return Err(UnknownParameterError::new(name));
        }
        self.hooks.insert(name.to_string(), Arc::new(hook));
        Ok(())
    }
}

/// Validate a full candidate record, conforming each value to its
/// declaration. Collects every violation.
fn conform_record(
    declarations: &[Declaration],
    record: ParameterRecord,
) -> Result<ParameterRecord, ValidationError> {
    let mut values = Vec::with_capacity(record.values.len());
    let mut violations = Vec::new();
    for (decl, value) in declarations.iter().zip(record.values) {
        match conform_value(value, decl) {
            Ok(v) => values.push(v),
            Err(reason) => violations.push(Violation::new(&decl.name, reason)),
        }
    }
    if violations.is_empty() {
        Ok(ParameterRecord { values })
    } else {
        Err(ValidationError::new(violations))
    }
}

/// Check a value against one declaration, applying the int→float widening
/// coercion. Returns the conformed value or the violated constraint.
fn conform_value(value: ParamValue, decl: &Declaration) -> Result<ParamValue, String> {
    let value = match (decl.tag, value) {
        (TypeTag::Bool, v @ ParamValue::Bool(_)) => v,
        (TypeTag::Int, v @ ParamValue::Int(_)) => v,
        (TypeTag::Float, ParamValue::Int(i)) => ParamValue::Float(i as f64),
        (TypeTag::Float, v @ ParamValue::Float(_)) => v,
        (TypeTag::Str | TypeTag::Text | TypeTag::Select, v @ ParamValue::Str(_)) => v,
        (TypeTag::List, v @ ParamValue::List(_)) => v,
        (tag, v) => {
            return Err(format!("expected {} value, got {}", tag, v.type_name()));
        }
    };

    if let ParamValue::Int(v) = value
        && let Some(range) = &decl.int_range
    {
        if let Some(min) = range.min
            && v < min
        {
            return Err(format!("value {} below minimum {}", v, min));
        }
        if let Some(max) = range.max
            && v > max
        {
            return Err(format!("value {} above maximum {}", v, max));
        }
    }

    // NaN/infinity would slip past the range comparisons and have no JSON
    // representation, so they are never valid float values.
    if let ParamValue::Float(v) = value
        && !v.is_finite()
    {
        return Err(format!("value {} is not a finite number", v));
    }

    if let ParamValue::Float(v) = value
        && let Some(range) = &decl.float_range
    {
        if let Some(min) = range.min
            && v < min
        {
            return Err(format!("value {} below minimum {}", v, min));
        }
        if let Some(max) = range.max
            && v > max
        {
            return Err(format!("value {} above maximum {}", v, max));
        }
    }

    if decl.tag == TypeTag::Select
        && let ParamValue::Str(s) = &value
        && let Some(choices) = &decl.choices
        && !choices.iter().any(|c| c == s)
    {
        return Err(format!("value '{}' is not one of [{}]", s, choices.join(", ")));
    }

    Ok(value)
}
