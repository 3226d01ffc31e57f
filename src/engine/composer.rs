//! Schema composer.
//!
//! Builds the combined document
//!
//! ```json
//! {
//!   "$schema": "http://json-schema.org/draft-07/schema#",
//!   "definitions": { "fields": { ... }, "objects": { ... } }
//! }
//! ```
//!
//! and inlines every local `$ref` depth first. Members written next to a
//! `$ref` are overlaid on the resolved target. Composition either returns the
//! whole document or the first reference error.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::{debug, info};

use super::loader::{index_catalogs, CatalogIndex, DuplicatePolicy};
use super::pointer;
use crate::domain::{EngineError, Namespace};

pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// The combined document with every internal reference inlined
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedSchema(Value);

impl ResolvedSchema {
    pub fn document(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.definition(Namespace::Fields, name)
    }

    pub fn object(&self, name: &str) -> Option<&Value> {
        self.definition(Namespace::Objects, name)
    }

    /// Like [`ResolvedSchema::object`], failing with the pointer that was looked up.
    pub fn require_object(&self, name: &str) -> Result<&Value, EngineError> {
        self.object(name).ok_or_else(|| EngineError::UnresolvedReference {
            pointer: format!("{}{}", Namespace::Objects.ref_prefix(), name),
            location: "#".to_string(),
        })
    }

    pub fn object_names(&self) -> Vec<&str> {
        self.0["definitions"][Namespace::Objects.as_str()]
            .as_object()
            .map(|objects| objects.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn definition(&self, namespace: Namespace, name: &str) -> Option<&Value> {
        self.0
            .get("definitions")?
            .get(namespace.as_str())?
            .get(name)
    }
}

/// Compose with the default (last-wins) duplicate policy.
pub fn compose(fields: &[Value], objects: &[Value]) -> Result<ResolvedSchema, EngineError> {
    compose_with_policy(fields, objects, DuplicatePolicy::default())
}

pub fn compose_with_policy(
    fields: &[Value],
    objects: &[Value],
    policy: DuplicatePolicy,
) -> Result<ResolvedSchema, EngineError> {
    let index = index_catalogs(fields, objects, policy)?;
    let (field_count, object_count) = (index.fields.len(), index.objects.len());

    let document = combined_document(index);
    let resolved = Dereferencer::new(&document).run()?;

    info!(
        "Composed schema from {} fields and {} objects",
        field_count, object_count
    );
    Ok(ResolvedSchema(resolved))
}

/// Root document holding both catalogs under `definitions`.
pub fn combined_document(index: CatalogIndex) -> Value {
    json!({
        "$schema": DRAFT_07,
        "definitions": {
            "fields": Value::Object(index.fields),
            "objects": Value::Object(index.objects),
        }
    })
}

/// Whether any object node in `value` still carries a string `$ref`.
pub fn contains_ref(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            matches!(map.get("$ref"), Some(Value::String(_))) || map.values().any(contains_ref)
        }
        Value::Array(items) => items.iter().any(contains_ref),
        _ => false,
    }
}

struct Dereferencer<'a> {
    root: &'a Value,
    /// References being expanded on the current path
    stack: Vec<String>,
    /// Fully expanded targets, keyed by reference text
    expanded: HashMap<String, Value>,
}

impl<'a> Dereferencer<'a> {
    fn new(root: &'a Value) -> Self {
        Self {
            root,
            stack: Vec::new(),
            expanded: HashMap::new(),
        }
    }

    fn run(mut self) -> Result<Value, EngineError> {
        let root = self.root;
        self.expand(root, &mut Vec::new())
    }

    fn expand(&mut self, node: &'a Value, location: &mut Vec<String>) -> Result<Value, EngineError> {
        match node {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    return self.expand_reference(reference, map, location);
                }
                let mut out = Map::new();
                for (key, child) in map {
                    location.push(key.clone());
                    let value = self.expand(child, location)?;
                    location.pop();
                    out.insert(key.clone(), value);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, child) in items.iter().enumerate() {
                    location.push(idx.to_string());
                    out.push(self.expand(child, location)?);
                    location.pop();
                }
                Ok(Value::Array(out))
            }
            scalar => Ok(scalar.clone()),
        }
    }

    fn expand_reference(
        &mut self,
        reference: &str,
        node: &'a Map<String, Value>,
        location: &mut Vec<String>,
    ) -> Result<Value, EngineError> {
        let target = self.follow(reference, location)?;

        let mut siblings = node.iter().filter(|(key, _)| key.as_str() != "$ref").peekable();
        if siblings.peek().is_none() {
            return Ok(target);
        }

        match target {
            Value::Object(mut merged) => {
                for (key, child) in siblings {
                    location.push(key.clone());
                    let value = self.expand(child, location)?;
                    location.pop();
                    merged.insert(key.clone(), value);
                }
                Ok(Value::Object(merged))
            }
            other => {
                debug!(
                    "Dropping members next to '{}' at {}: target is not an object",
                    reference,
                    pointer::join(location.iter())
                );
                Ok(other)
            }
        }
    }

    fn follow(&mut self, reference: &str, location: &[String]) -> Result<Value, EngineError> {
        if let Some(done) = self.expanded.get(reference) {
            return Ok(done.clone());
        }

        if let Some(start) = self.stack.iter().position(|p| p == reference) {
            let mut chain = self.stack[start..].to_vec();
            chain.push(reference.to_string());
            return Err(EngineError::CyclicReference {
                pointer: reference.to_string(),
                chain,
            });
        }

        let unresolved = || EngineError::UnresolvedReference {
            pointer: reference.to_string(),
            location: pointer::join(location.iter()),
        };
        let mut tokens = pointer::parse(reference).ok_or_else(unresolved)?;
        let root = self.root;
        let target = pointer::lookup(root, &tokens).ok_or_else(unresolved)?;

        self.stack.push(reference.to_string());
        let result = self.expand(target, &mut tokens);
        self.stack.pop();

        let value = result?;
        self.expanded.insert(reference.to_string(), value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<Value> {
        vec![
            json!({ "$id": "#/definitions/fields/Name", "type": "string", "displayName": "Name" }),
            json!({ "$id": "#/definitions/fields/Age", "type": "integer", "default": 18 }),
        ]
    }

    #[test]
    fn test_compose_inlines_field_refs() {
        let objects = vec![json!({
            "$id": "#/definitions/objects/Person",
            "type": "object",
            "properties": {
                "name": { "$ref": "#/definitions/fields/Name" },
                "age": { "$ref": "#/definitions/fields/Age" }
            }
        })];

        let resolved = compose(&fields(), &objects).unwrap();
        let person = resolved.object("Person").unwrap();

        assert_eq!(person["properties"]["name"]["type"], "string");
        assert_eq!(person["properties"]["age"]["default"], 18);
        assert!(!contains_ref(resolved.document()));
        assert_eq!(resolved.document()["$schema"], DRAFT_07);
        assert_eq!(resolved.object_names(), vec!["Person"]);
        assert!(resolved.field("Name").is_some());
    }

    #[test]
    fn test_compose_nested_object_refs() {
        let objects = vec![
            json!({
                "$id": "#/definitions/objects/Address",
                "type": "object",
                "properties": { "city": { "$ref": "#/definitions/fields/Name" } }
            }),
            json!({
                "$id": "#/definitions/objects/Person",
                "type": "object",
                "properties": { "home": { "$ref": "#/definitions/objects/Address" } }
            }),
        ];

        let resolved = compose(&fields(), &objects).unwrap();
        let person = resolved.object("Person").unwrap();
        assert_eq!(person["properties"]["home"]["properties"]["city"]["type"], "string");
        assert!(!contains_ref(resolved.document()));
    }

    #[test]
    fn test_sibling_members_override_target() {
        let objects = vec![json!({
            "$id": "Person",
            "properties": {
                "nick": { "$ref": "#/definitions/fields/Name", "description": "Nickname" }
            }
        })];

        let resolved = compose(&fields(), &objects).unwrap();
        let nick = &resolved.object("Person").unwrap()["properties"]["nick"];
        assert_eq!(nick["description"], "Nickname");
        assert_eq!(nick["type"], "string");
        assert!(nick.get("$ref").is_none());
    }

    #[test]
    fn test_cycle_is_rejected() {
        let objects = vec![
            json!({ "$id": "A", "properties": { "b": { "$ref": "#/definitions/objects/B" } } }),
            json!({ "$id": "B", "properties": { "a": { "$ref": "#/definitions/objects/A" } } }),
        ];

        let err = compose(&[], &objects).unwrap_err();
        match err {
            EngineError::CyclicReference { pointer, chain } => {
                assert_eq!(chain.first(), chain.last());
                assert!(chain.contains(&"#/definitions/objects/A".to_string()));
                assert!(chain.contains(&"#/definitions/objects/B".to_string()));
                assert_eq!(chain.last(), Some(&pointer));
            }
            other => panic!("expected cyclic reference, got {other:?}"),
        }
    }

    #[test]
    fn test_self_reference_is_rejected() {
        let objects = vec![json!({
            "$id": "Node",
            "properties": { "next": { "$ref": "#/definitions/objects/Node" } }
        })];
        assert!(matches!(
            compose(&[], &objects),
            Err(EngineError::CyclicReference { .. })
        ));
    }

    #[test]
    fn test_missing_target_reports_pointer_and_location() {
        let objects = vec![json!({
            "$id": "Person",
            "properties": { "email": { "$ref": "#/definitions/fields/Email" } }
        })];

        let err = compose(&fields(), &objects).unwrap_err();
        match err {
            EngineError::UnresolvedReference { pointer, location } => {
                assert_eq!(pointer, "#/definitions/fields/Email");
                assert_eq!(location, "#/definitions/objects/Person/properties/email");
            }
            other => panic!("expected unresolved reference, got {other:?}"),
        }
    }

    #[test]
    fn test_external_reference_is_unresolved() {
        let objects = vec![json!({
            "$id": "Person",
            "properties": { "x": { "$ref": "https://example.com/schema.json#/x" } }
        })];
        let err = compose(&[], &objects).unwrap_err();
        assert_eq!(err.pointer(), Some("https://example.com/schema.json#/x"));
    }

    #[test]
    fn test_shared_target_is_inlined_everywhere() {
        let objects = vec![json!({
            "$id": "Pair",
            "properties": {
                "first": { "$ref": "#/definitions/fields/Name" },
                "second": { "$ref": "#/definitions/fields/Name" }
            }
        })];
        let resolved = compose(&fields(), &objects).unwrap();
        let pair = resolved.object("Pair").unwrap();
        assert_eq!(pair["properties"]["first"], pair["properties"]["second"]);
        assert_eq!(&pair["properties"]["first"], resolved.field("Name").unwrap());
    }

    #[test]
    fn test_non_string_ref_member_is_plain_data() {
        let objects = vec![json!({
            "$id": "Odd",
            "properties": { "$ref": { "type": "string" } }
        })];
        let resolved = compose(&[], &objects).unwrap();
        assert_eq!(resolved.object("Odd").unwrap()["properties"]["$ref"]["type"], "string");
    }

    #[test]
    fn test_require_object_names_pointer() {
        let resolved = compose(&fields(), &[]).unwrap();
        let err = resolved.require_object("Missing").unwrap_err();
        assert_eq!(err.pointer(), Some("#/definitions/objects/Missing"));
    }
}
