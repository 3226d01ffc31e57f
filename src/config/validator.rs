use std::collections::HashSet;
use thiserror::Error;

use crate::config::{CatalogSettings, ServerSettings, Settings};
use crate::engine::{LayoutPolicy, SchemaType};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

pub struct ConfigValidator;

impl ConfigValidator {
    /// Collect every problem in the settings instead of stopping at the first.
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_server(&settings.server) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_catalog(&settings.catalog) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_layout(&settings.layout) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_catalog(catalog: &CatalogSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("catalog.fields_path", &catalog.fields_path),
            ("catalog.objects_path", &catalog.objects_path),
            ("catalog.fields_key", &catalog.fields_key),
            ("catalog.objects_key", &catalog.objects_key),
        ] {
            if value.trim().is_empty() {
                errors.push(ValidationError::MissingField(field.to_string()));
            }
        }

        if catalog.active_object.as_deref().is_some_and(|o| o.trim().is_empty()) {
            errors.push(ValidationError::InvalidValue {
                field: "catalog.active_object".to_string(),
                reason: "Object name cannot be empty".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_layout(layout: &LayoutPolicy) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (idx, rule) in layout.rules.iter().enumerate() {
            if rule.fields.is_empty() {
                errors.push(ValidationError::MissingField(format!(
                    "layout.rules[{}].fields",
                    idx
                )));
            }

            let mut seen = HashSet::new();
            for field in &rule.fields {
                if !seen.insert(field) {
                    errors.push(ValidationError::Duplicate(format!(
                        "Field '{}' listed twice in layout.rules[{}]",
                        field, idx
                    )));
                }
            }

            if rule.types.is_empty() {
                errors.push(ValidationError::MissingField(format!(
                    "layout.rules[{}].types",
                    idx
                )));
            }
            for ty in &rule.types {
                if SchemaType::parse(ty).is_none() {
                    errors.push(ValidationError::InvalidValue {
                        field: format!("layout.rules[{}].types", idx),
                        reason: format!("'{}' is not a JSON Schema type", ty),
                    });
                }
            }

            if rule.placeholder_template.trim().is_empty() {
                errors.push(ValidationError::MissingField(format!(
                    "layout.rules[{}].placeholder_template",
                    idx
                )));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
