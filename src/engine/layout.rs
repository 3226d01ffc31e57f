//! Layout synthesizer and the presentation policy deciding which controls get
//! extra options.
//!
//! ## Example policy (TOML)
//!
//! ```toml
//! [[layout.rules]]
//! fields = ["Id", "name", "Address", "AdminEmail"]
//! placeholder_template = "Enter {label}"
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::pointer;
use super::schema::{declared_types, ObjectSchema};
use crate::domain::{ControlOptions, LayoutElement};

/// Decides the presentation options of a single control
pub trait ControlPolicy {
    fn options(&self, name: &str, property: &Value) -> Option<ControlOptions>;
}

impl<F> ControlPolicy for F
where
    F: Fn(&str, &Value) -> Option<ControlOptions>,
{
    fn options(&self, name: &str, property: &Value) -> Option<ControlOptions> {
        self(name, property)
    }
}

/// Ordered presentation rules; the first matching rule decides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPolicy {
    #[serde(default)]
    pub rules: Vec<PresentationRule>,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            rules: vec![PresentationRule::emphasized(["Id", "name", "Address", "AdminEmail"])],
        }
    }
}

impl LayoutPolicy {
    /// A policy that never adds options.
    pub fn plain() -> Self {
        Self { rules: Vec::new() }
    }
}

impl ControlPolicy for LayoutPolicy {
    fn options(&self, name: &str, property: &Value) -> Option<ControlOptions> {
        self.rules
            .iter()
            .find(|rule| rule.matches(name, property))
            .map(|rule| rule.options_for(name, property))
    }
}

/// Adds a placeholder to controls whose property name is on an allow-list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationRule {
    /// Property names this rule applies to
    pub fields: Vec<String>,
    /// Declared types that qualify; a property matches if it declares any of them
    #[serde(default = "default_rule_types")]
    pub types: Vec<String>,
    /// Apply to read-only properties as well
    #[serde(default)]
    pub include_read_only: bool,
    /// `fieldType` value that marks a property read-only
    #[serde(default = "default_read_only_field_type")]
    pub read_only_field_type: String,
    /// Placeholder used when the property has no description; `{label}` is
    /// replaced by the display name or the property name
    #[serde(default = "default_placeholder_template")]
    pub placeholder_template: String,
    #[serde(default = "default_custom_style")]
    pub custom_style: bool,
}

fn default_rule_types() -> Vec<String> {
    vec!["string".to_string()]
}

fn default_read_only_field_type() -> String {
    "ReadOnly".to_string()
}

fn default_placeholder_template() -> String {
    "Enter {label}".to_string()
}

fn default_custom_style() -> bool {
    true
}

impl PresentationRule {
    pub fn emphasized<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            types: default_rule_types(),
            include_read_only: false,
            read_only_field_type: default_read_only_field_type(),
            placeholder_template: default_placeholder_template(),
            custom_style: default_custom_style(),
        }
    }

    pub fn matches(&self, name: &str, property: &Value) -> bool {
        let typed = declared_types(property)
            .iter()
            .any(|declared| self.types.iter().any(|t| t == declared));
        let writable = self.include_read_only || !self.is_read_only(property);
        typed && writable && self.fields.iter().any(|field| field == name)
    }

    fn is_read_only(&self, property: &Value) -> bool {
        property.get("readOnly").and_then(Value::as_bool).unwrap_or(false)
            || property.get("fieldType").and_then(Value::as_str)
                == Some(self.read_only_field_type.as_str())
    }

    fn options_for(&self, name: &str, property: &Value) -> ControlOptions {
        // Empty strings count as absent
        let text = |key: &str| {
            property
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        };
        let placeholder = match text("description") {
            Some(description) => description.to_string(),
            None => {
                let label = text("displayName").unwrap_or(name);
                self.placeholder_template.replace("{label}", label)
            }
        };

        ControlOptions {
            custom_style: self.custom_style.then_some(true),
            placeholder: Some(placeholder),
            extra: Map::new(),
        }
    }
}

/// One control per declared property, in declaration order.
pub fn synthesize_layout(schema: ObjectSchema<'_>, policy: &impl ControlPolicy) -> LayoutElement {
    let Some(properties) = schema.properties() else {
        return LayoutElement::control("#");
    };

    let elements = properties
        .iter()
        .map(|(name, property)| LayoutElement::Control {
            scope: pointer::join(["properties", name.as_str()]),
            label: None,
            options: policy.options(name, property),
        })
        .collect();

    LayoutElement::VerticalLayout { elements }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layout(schema: &Value) -> LayoutElement {
        synthesize_layout(ObjectSchema::new(schema).unwrap(), &LayoutPolicy::default())
    }

    #[test]
    fn test_one_control_per_property_in_order() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "email": { "type": "string" },
                "age": { "type": "integer" }
            }
        });

        let layout = layout(&schema);
        let scopes: Vec<&str> = layout.elements().iter().filter_map(|e| e.scope()).collect();
        assert_eq!(
            scopes,
            vec!["#/properties/name", "#/properties/email", "#/properties/age"]
        );
        assert!(matches!(layout, LayoutElement::VerticalLayout { .. }));
    }

    #[test]
    fn test_schema_without_properties_is_root_control() {
        assert_eq!(layout(&json!({ "type": "string" })), LayoutElement::control("#"));
    }

    #[test]
    fn test_empty_properties_is_empty_layout() {
        let layout = layout(&json!({ "properties": {} }));
        assert_eq!(layout, LayoutElement::VerticalLayout { elements: vec![] });
    }

    #[test]
    fn test_allow_listed_string_gets_placeholder() {
        let schema = json!({
            "properties": {
                "name": { "type": "string" },
                "internalId": { "type": "string" }
            }
        });
        let layout = layout(&schema);

        let name = layout.elements()[0].options().unwrap();
        assert_eq!(name.placeholder.as_deref(), Some("Enter name"));
        assert_eq!(name.custom_style, Some(true));
        assert!(layout.elements()[1].options().is_none());
    }

    #[test]
    fn test_placeholder_prefers_description_then_display_name() {
        let schema = json!({
            "properties": {
                "Id": { "type": "string", "description": "Inventory identifier" },
                "Address": { "type": ["string", "null"], "displayName": "Street address" }
            }
        });
        let layout = layout(&schema);
        assert_eq!(
            layout.elements()[0].options().unwrap().placeholder.as_deref(),
            Some("Inventory identifier")
        );
        assert_eq!(
            layout.elements()[1].options().unwrap().placeholder.as_deref(),
            Some("Enter Street address")
        );
    }

    #[test]
    fn test_empty_description_and_display_name_fall_back() {
        let schema = json!({
            "properties": {
                "name": { "type": "string", "description": "" },
                "Id": { "type": "string", "displayName": "" }
            }
        });
        let layout = layout(&schema);
        assert_eq!(
            layout.elements()[0].options().unwrap().placeholder.as_deref(),
            Some("Enter name")
        );
        assert_eq!(
            layout.elements()[1].options().unwrap().placeholder.as_deref(),
            Some("Enter Id")
        );
    }

    #[test]
    fn test_read_only_and_non_string_are_excluded() {
        let schema = json!({
            "properties": {
                "Id": { "type": "string", "fieldType": "ReadOnly" },
                "name": { "type": "string", "readOnly": true },
                "Address": { "type": "integer" },
                "AdminEmail": { "description": "no type" }
            }
        });
        let layout = layout(&schema);
        assert!(layout.elements().iter().all(|e| e.options().is_none()));
    }

    #[test]
    fn test_custom_rules_and_closure_policy() {
        let policy = LayoutPolicy {
            rules: vec![PresentationRule {
                fields: vec!["age".to_string()],
                types: vec!["integer".to_string()],
                include_read_only: true,
                read_only_field_type: "Locked".to_string(),
                placeholder_template: "How old is {label}?".to_string(),
                custom_style: false,
            }],
        };
        let schema = json!({
            "properties": { "age": { "type": "integer", "fieldType": "Locked" } }
        });
        let layout = synthesize_layout(ObjectSchema::new(&schema).unwrap(), &policy);
        let options = layout.elements()[0].options().unwrap();
        assert_eq!(options.placeholder.as_deref(), Some("How old is age?"));
        assert_eq!(options.custom_style, None);

        let everything = |name: &str, _: &Value| {
            Some(ControlOptions {
                placeholder: Some(name.to_uppercase()),
                ..Default::default()
            })
        };
        let layout = synthesize_layout(ObjectSchema::new(&schema).unwrap(), &everything);
        assert_eq!(
            layout.elements()[0].options().unwrap().placeholder.as_deref(),
            Some("AGE")
        );
    }

    #[test]
    fn test_scope_escapes_property_names() {
        let schema = json!({ "properties": { "a/b": { "type": "string" } } });
        assert_eq!(layout(&schema).elements()[0].scope(), Some("#/properties/a~1b"));
    }

    #[test]
    fn test_plain_policy_and_serialized_shape() {
        let schema = json!({ "properties": { "name": { "type": "string" } } });
        let layout = synthesize_layout(ObjectSchema::new(&schema).unwrap(), &LayoutPolicy::plain());
        assert_eq!(
            serde_json::to_value(&layout).unwrap(),
            json!({
                "type": "VerticalLayout",
                "elements": [ { "type": "Control", "scope": "#/properties/name" } ]
            })
        );
    }
}
