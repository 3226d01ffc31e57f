//! Error types for the composition and synthesis engine

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading catalogs, composing schemas or synthesizing
/// data and layouts.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Two fragments in the same catalog normalize to the same identifier
    #[error("Duplicate identifier '{id}' in {namespace} catalog")]
    DuplicateIdentifier { namespace: String, id: String },

    /// A `$ref` points outside the combined document or at nothing
    #[error("Unresolved reference '{pointer}' at {location}")]
    UnresolvedReference { pointer: String, location: String },

    /// A `$ref` was met again while it was still being expanded
    #[error("Cyclic reference '{pointer}' (via {})", chain.join(" -> "))]
    CyclicReference { pointer: String, chain: Vec<String> },

    /// A value that must be a JSON object is something else
    #[error("Malformed input at {path}: {reason}")]
    MalformedInput { path: String, reason: String },

    /// Catalog file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog file could not be parsed
    #[error("Failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
}

impl EngineError {
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// The JSON pointer or property path the error is about, if any.
    pub fn pointer(&self) -> Option<&str> {
        match self {
            Self::UnresolvedReference { pointer, .. } | Self::CyclicReference { pointer, .. } => {
                Some(pointer)
            }
            Self::MalformedInput { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_message_lists_chain() {
        let err = EngineError::CyclicReference {
            pointer: "#/definitions/objects/A".to_string(),
            chain: vec![
                "#/definitions/objects/A".to_string(),
                "#/definitions/objects/B".to_string(),
                "#/definitions/objects/A".to_string(),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("objects/A -> #/definitions/objects/B"));
        assert_eq!(err.pointer(), Some("#/definitions/objects/A"));
    }

    #[test]
    fn test_duplicate_has_no_pointer() {
        let err = EngineError::DuplicateIdentifier {
            namespace: "fields".to_string(),
            id: "Name".to_string(),
        };
        assert!(err.pointer().is_none());
        assert_eq!(err.to_string(), "Duplicate identifier 'Name' in fields catalog");
    }
}
