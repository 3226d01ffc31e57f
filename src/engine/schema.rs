//! Read-only views over resolved object schemas.

use serde_json::{Map, Value};

use crate::domain::EngineError;

/// JSON Schema primitive types the synthesizers care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Null,
}

impl SchemaType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            "null" => Some(Self::Null),
            _ => None,
        }
    }
}

/// Declared type names of a property schema, in declaration order.
///
/// `"type": "string"` and `"type": ["string", "null"]` are both accepted;
/// anything else declares no type.
pub fn declared_types(property: &Value) -> Vec<&str> {
    match property.get("type") {
        Some(Value::String(name)) => vec![name.as_str()],
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Type used to pick a zero value: the first declared alternative.
pub fn primary_type(property: &Value) -> Option<SchemaType> {
    match property.get("type")? {
        Value::String(name) => SchemaType::parse(name),
        Value::Array(names) => names.first()?.as_str().and_then(SchemaType::parse),
        _ => None,
    }
}

/// A schema known to be a JSON object.
#[derive(Debug, Clone, Copy)]
pub struct ObjectSchema<'a> {
    schema: &'a Map<String, Value>,
}

impl<'a> ObjectSchema<'a> {
    pub fn new(schema: &'a Value) -> Result<Self, EngineError> {
        match schema {
            Value::Object(schema) => Ok(Self { schema }),
            _ => Err(EngineError::malformed("#", "schema must be a JSON object")),
        }
    }

    pub fn raw(&self) -> &'a Map<String, Value> {
        self.schema
    }

    /// Declared properties, or `None` when `properties` is absent or not an object.
    pub fn properties(&self) -> Option<&'a Map<String, Value>> {
        self.schema.get("properties").and_then(Value::as_object)
    }
}
