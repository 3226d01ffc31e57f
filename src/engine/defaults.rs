//! Default-data synthesizer.
//!
//! One key per declared property: the declared `default` when present,
//! otherwise the zero value of the property's type. Object properties recurse.

use serde_json::{json, Map, Value};

use super::schema::{primary_type, ObjectSchema, SchemaType};

pub fn synthesize_defaults(schema: ObjectSchema<'_>) -> Map<String, Value> {
    defaults_for(schema.raw())
}

fn defaults_for(schema: &Map<String, Value>) -> Map<String, Value> {
    let mut data = Map::new();
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return data;
    };

    for (name, property) in properties {
        data.insert(name.clone(), default_value(property));
    }
    data
}

/// Default value for a single property schema.
pub fn default_value(property: &Value) -> Value {
    if let Some(declared) = property.get("default") {
        return declared.clone();
    }

    match primary_type(property) {
        Some(SchemaType::String) => json!(""),
        Some(SchemaType::Integer) | Some(SchemaType::Number) => json!(0),
        Some(SchemaType::Boolean) => json!(false),
        Some(SchemaType::Array) => json!([]),
        Some(SchemaType::Object) => match property {
            Value::Object(nested) => Value::Object(defaults_for(nested)),
            _ => Value::Null,
        },
        Some(SchemaType::Null) | None => Value::Null,
    }
}
