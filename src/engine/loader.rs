//! Definition loader: indexes field and object catalogs by identifier.
//!
//! Fragments carry a `$id` (or `id`) of the form
//! `#/definitions/<namespace>/<name>`; the namespace prefix is stripped so the
//! index is keyed by the bare name. Fragments without an identifier are
//! skipped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{EngineError, Namespace};

/// What to do when two fragments of one catalog share an identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later fragment replaces the earlier one; a diagnostic is recorded
    #[default]
    LastWins,
    /// Loading fails on the first duplicate
    Reject,
}

/// Both catalogs indexed by normalized identifier, in first-seen order
#[derive(Debug, Default)]
pub struct CatalogIndex {
    pub fields: Map<String, Value>,
    pub objects: Map<String, Value>,
    /// Duplicates that were overwritten under [`DuplicatePolicy::LastWins`]
    pub duplicates: Vec<EngineError>,
}

/// Index both catalogs.
pub fn index_catalogs(
    fields: &[Value],
    objects: &[Value],
    policy: DuplicatePolicy,
) -> Result<CatalogIndex, EngineError> {
    let mut index = CatalogIndex::default();
    index.fields = index_namespace(Namespace::Fields, fields, policy, &mut index.duplicates)?;
    index.objects = index_namespace(Namespace::Objects, objects, policy, &mut index.duplicates)?;
    Ok(index)
}

fn index_namespace(
    namespace: Namespace,
    fragments: &[Value],
    policy: DuplicatePolicy,
    duplicates: &mut Vec<EngineError>,
) -> Result<Map<String, Value>, EngineError> {
    let mut indexed = Map::new();

    for (idx, fragment) in fragments.iter().enumerate() {
        let Value::Object(map) = fragment else {
            return Err(EngineError::malformed(
                format!("{}[{}]", namespace, idx),
                "catalog entry must be a JSON object",
            ));
        };

        let Some(id) = fragment_id(map, namespace) else {
            debug!("Skipping {}[{}]: no identifier", namespace, idx);
            continue;
        };

        if indexed.contains_key(&id) {
            let duplicate = EngineError::DuplicateIdentifier {
                namespace: namespace.to_string(),
                id: id.clone(),
            };
            match policy {
                DuplicatePolicy::Reject => return Err(duplicate),
                DuplicatePolicy::LastWins => {
                    warn!("{} at {}[{}]; keeping the later fragment", duplicate, namespace, idx);
                    duplicates.push(duplicate);
                }
            }
        }

        // Map::insert keeps the slot of an existing key
        indexed.insert(id, fragment.clone());
    }

    Ok(indexed)
}

/// Normalized identifier of a fragment, if it has a usable one.
pub fn fragment_id(fragment: &Map<String, Value>, namespace: Namespace) -> Option<String> {
    let raw = fragment
        .get("$id")
        .or_else(|| fragment.get("id"))
        .and_then(Value::as_str)?;
    let id = normalize_id(raw, namespace);
    (!id.is_empty()).then(|| id.to_string())
}

/// Strip the `#/definitions/<namespace>/` prefix from an identifier.
///
/// The rest is kept verbatim, whitespace included, so it matches a `$ref`
/// spelled the same way.
pub fn normalize_id(raw: &str, namespace: Namespace) -> &str {
    let prefix = namespace.ref_prefix();
    raw.strip_prefix(prefix.as_str()).unwrap_or(raw)
}

/// Pull the fragment array out of a catalog document.
///
/// The document is either the array itself or an object holding it under `key`.
pub fn extract_fragments(document: Value, key: &str) -> Result<Vec<Value>, EngineError> {
    match document {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(EngineError::malformed(key, "expected an array of fragments")),
            None => Err(EngineError::malformed(
                key,
                "catalog document has no such top-level key",
            )),
        },
        _ => Err(EngineError::malformed(
            "#",
            "catalog document must be an array or an object",
        )),
    }
}
