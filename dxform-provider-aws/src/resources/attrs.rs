//! Typed access to declared attributes and helpers for building state

use std::collections::HashMap;

use dxform_core::resource::{ResourceId, State, Value};

use crate::api::Tags;
use crate::error::{DxError, Result};

pub type Attributes = HashMap<String, Value>;

pub fn required_str(attrs: &Attributes, name: &str) -> Result<String> {
    match attrs.get(name) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) | None => Err(DxError::MissingAttribute(name.to_string())),
        Some(other) => Err(invalid(name, "a string", other)),
    }
}

pub fn optional_str(attrs: &Attributes, name: &str) -> Option<String> {
    attrs
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn required_int(attrs: &Attributes, name: &str) -> Result<i64> {
    match attrs.get(name) {
        Some(value) => value
            .as_int()
            .ok_or_else(|| invalid(name, "an integer", value)),
        None => Err(DxError::MissingAttribute(name.to_string())),
    }
}

pub fn optional_int(attrs: &Attributes, name: &str) -> Result<Option<i64>> {
    attrs
        .get(name)
        .map(|value| value.as_int().ok_or_else(|| invalid(name, "an integer", value)))
        .transpose()
}

/// An integer attribute that must fit the API's 32-bit fields
pub fn int32(name: &str, value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| DxError::InvalidAttribute {
        name: name.to_string(),
        message: format!("{} is out of range", value),
    })
}

pub fn bool_or(attrs: &Attributes, name: &str, default: bool) -> bool {
    attrs.get(name).and_then(Value::as_bool).unwrap_or(default)
}

pub fn optional_bool(attrs: &Attributes, name: &str) -> Option<bool> {
    attrs.get(name).and_then(Value::as_bool)
}

pub fn string_list(attrs: &Attributes, name: &str) -> Vec<String> {
    match attrs.get(name) {
        Some(Value::List(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

pub fn tags(attrs: &Attributes) -> Tags {
    match attrs.get("tags") {
        Some(Value::Map(map)) => map
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
            .collect(),
        _ => Tags::new(),
    }
}

fn invalid(name: &str, expected: &str, got: &Value) -> DxError {
    DxError::InvalidAttribute {
        name: name.to_string(),
        message: format!("expected {}, got {:?}", expected, got),
    }
}

/// The remote identifier recorded in state
pub fn identifier(state: &State) -> Result<&str> {
    state
        .identifier
        .as_deref()
        .ok_or_else(|| DxError::MissingAttribute("id".to_string()))
}

/// Attribute map under construction for a [`State`]
#[derive(Debug, Default)]
pub struct StateBuilder {
    attrs: Attributes,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn str(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(name.to_string(), Value::String(value.into()));
        self
    }

    /// Set `name` when `value` is present and non-empty
    pub fn opt_str(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.attrs.insert(name.to_string(), Value::String(v.to_string()));
        }
        self
    }

    pub fn int(mut self, name: &str, value: i64) -> Self {
        self.attrs.insert(name.to_string(), Value::Int(value));
        self
    }

    pub fn opt_int(mut self, name: &str, value: Option<i64>) -> Self {
        if let Some(v) = value {
            self.attrs.insert(name.to_string(), Value::Int(v));
        }
        self
    }

    pub fn bool(mut self, name: &str, value: bool) -> Self {
        self.attrs.insert(name.to_string(), Value::Bool(value));
        self
    }

    pub fn opt_bool(mut self, name: &str, value: Option<bool>) -> Self {
        if let Some(v) = value {
            self.attrs.insert(name.to_string(), Value::Bool(v));
        }
        self
    }

    pub fn list(mut self, name: &str, values: &[String]) -> Self {
        self.attrs.insert(
            name.to_string(),
            Value::List(values.iter().map(|v| Value::String(v.clone())).collect()),
        );
        self
    }

    pub fn tags(mut self, tags: &Tags) -> Self {
        self.attrs.insert(
            "tags".to_string(),
            Value::Map(
                tags.iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        );
        self
    }

    pub fn build(self, id: &ResourceId, identifier: impl Into<String>) -> State {
        State::existing(id.clone(), self.attrs).with_identifier(identifier)
    }
}

/// Copy `names` from `from` into `state` where the read left them unset
pub fn carry(state: &mut State, from: &Attributes, names: &[&str]) {
    for name in names {
        if let Some(value) = from.get(*name)
            && !state.attributes.contains_key(*name)
        {
            state.attributes.insert(name.to_string(), value.clone());
        }
    }
}

/// State for an object that could not be found.
///
/// Right after a create the object must exist, so a missing object is an
/// error there; on refresh it is dropped from state.
pub fn missing(id: &ResourceId, identifier: &str, err: DxError, is_new: bool) -> Result<State> {
    if err.is_not_found() && !is_new {
        log::warn!("{} ({}) not found, removing from state", id, identifier);
        Ok(State::not_found(id.clone()))
    } else {
        Err(err)
    }
}
