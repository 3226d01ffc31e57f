//! Form session: the active schema, layout and data a renderer works with.
//!
//! Setters are tolerant. Input that does not parse, or parses to the wrong
//! shape, is logged and dropped so the previous state stays in place.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::domain::{EngineError, LayoutElement};
use crate::engine::{synthesize_defaults, synthesize_layout, ControlPolicy, ObjectSchema, ResolvedSchema};

/// Raw text from an editor or an already-parsed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionInput {
    Text(String),
    Value(Value),
}

impl From<&str> for SessionInput {
    fn from(text: &str) -> Self {
        SessionInput::Text(text.to_string())
    }
}

impl From<String> for SessionInput {
    fn from(text: String) -> Self {
        SessionInput::Text(text)
    }
}

impl From<Value> for SessionInput {
    fn from(value: Value) -> Self {
        SessionInput::Value(value)
    }
}

impl SessionInput {
    fn into_value(self) -> Result<Value, serde_json::Error> {
        match self {
            SessionInput::Text(text) => serde_json::from_str(&text),
            SessionInput::Value(value) => Ok(value),
        }
    }
}

/// Serializable view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub schema: Value,
    pub layout: LayoutElement,
    pub data: Value,
}

#[derive(Debug, Clone)]
pub struct FormSession {
    object: Option<String>,
    schema: Value,
    layout: LayoutElement,
    data: Map<String, Value>,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FormSession {
    /// A session showing a single `name` text field until a schema is activated.
    pub fn new() -> Self {
        Self {
            object: None,
            schema: json!({
                "type": "object",
                "properties": { "name": { "type": "string" } }
            }),
            layout: LayoutElement::control("#/properties/name"),
            data: Map::new(),
        }
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn layout(&self) -> &LayoutElement {
        &self.layout
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Name of the object schema last activated, if any.
    pub fn active_object(&self) -> Option<&str> {
        self.object.as_deref()
    }

    pub fn snapshot(&self) -> SessionState {
        SessionState {
            object: self.object.clone(),
            schema: self.schema.clone(),
            layout: self.layout.clone(),
            data: Value::Object(self.data.clone()),
        }
    }

    /// Make `object_name` from a composed schema the active form.
    ///
    /// Layout is regenerated; synthesized defaults are written over the
    /// matching keys of the current data, other keys are kept.
    pub fn activate(
        &mut self,
        resolved: &ResolvedSchema,
        object_name: &str,
        policy: &impl ControlPolicy,
    ) -> Result<(), EngineError> {
        let schema = resolved.require_object(object_name)?;
        let view = ObjectSchema::new(schema)?;
        let layout = synthesize_layout(view, policy);
        let defaults = synthesize_defaults(view);

        self.object = Some(object_name.to_string());
        self.schema = schema.clone();
        self.layout = layout;
        self.data.extend(defaults);
        debug!("Activated object schema {}", object_name);
        Ok(())
    }

    pub fn set_schema(&mut self, input: impl Into<SessionInput>) -> bool {
        match input.into().into_value() {
            Ok(schema @ Value::Object(_)) => {
                self.schema = schema;
                true
            }
            Ok(other) => {
                warn!("Invalid JSON Schema: expected an object, got {}", type_name(&other));
                false
            }
            Err(e) => {
                warn!("Invalid JSON Schema: {}", e);
                false
            }
        }
    }

    pub fn set_layout(&mut self, input: impl Into<SessionInput>) -> bool {
        let parsed = input
            .into()
            .into_value()
            .and_then(serde_json::from_value::<LayoutElement>);
        match parsed {
            Ok(layout) => {
                self.layout = layout;
                true
            }
            Err(e) => {
                warn!("Invalid UI Schema: {}", e);
                false
            }
        }
    }

    /// Replace the data with the given object.
    pub fn set_data(&mut self, input: impl Into<SessionInput>) -> bool {
        match input.into().into_value() {
            Ok(Value::Object(data)) => {
                self.data = data;
                true
            }
            Ok(other) => {
                warn!("Invalid Data: expected an object, got {}", type_name(&other));
                false
            }
            Err(e) => {
                warn!("Invalid Data: {}", e);
                false
            }
        }
    }

    /// Shallow-merge changed keys into the data, as a form change event does.
    pub fn merge_data(&mut self, changes: Map<String, Value>) {
        self.data.extend(changes);
    }

    /// Write a single edited value.
    ///
    /// `path` is a dotted data path (`owner.name`) or a control scope
    /// (`#/properties/owner/properties/name`). Missing intermediate objects
    /// are created.
    pub fn on_field_edit(&mut self, path: &str, value: Value) -> Result<(), EngineError> {
        let segments = data_path(path)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| EngineError::malformed(path, "empty field path"))?;

        let mut target = &mut self.data;
        for segment in parents {
            let slot = target
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            target = match slot {
                Value::Object(map) => map,
                other => {
                    return Err(EngineError::malformed(
                        path,
                        format!("'{}' holds {}, not an object", segment, type_name(other)),
                    ))
                }
            };
        }

        target.insert(last.clone(), value);
        Ok(())
    }
}

/// Split a dotted path or a control scope into data keys.
fn data_path(path: &str) -> Result<Vec<String>, EngineError> {
    if path.starts_with('#') {
        let tokens = crate::engine::pointer::parse(path)
            .ok_or_else(|| EngineError::malformed(path, "not a local scope"))?;
        let mut keys = Vec::new();
        let mut iter = tokens.into_iter();
        while let Some(token) = iter.next() {
            if token != "properties" {
                return Err(EngineError::malformed(
                    path,
                    format!("unexpected scope segment '{}'", token),
                ));
            }
            let key = iter
                .next()
                .ok_or_else(|| EngineError::malformed(path, "scope ends after 'properties'"))?;
            keys.push(key);
        }
        return Ok(keys);
    }

    if path.is_empty() {
        return Ok(Vec::new());
    }
    if path.split('.').any(str::is_empty) {
        return Err(EngineError::malformed(path, "empty path segment"));
    }
    Ok(path.split('.').map(str::to_string).collect())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
