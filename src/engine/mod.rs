//! The composition and derivation engine.
//!
//! Everything here is synchronous and pure: each call builds fresh output
//! from its inputs and shares no state with other calls.
//!
//! ```rust
//! use formsmith::engine::{self, LayoutPolicy, ObjectSchema};
//! use serde_json::json;
//!
//! let fields = vec![json!({ "$id": "#/definitions/fields/Name", "type": "string" })];
//! let objects = vec![json!({
//!     "$id": "#/definitions/objects/Person",
//!     "type": "object",
//!     "properties": { "name": { "$ref": "#/definitions/fields/Name" } }
//! })];
//!
//! let resolved = engine::compose(&fields, &objects).unwrap();
//! let person = ObjectSchema::new(resolved.object("Person").unwrap()).unwrap();
//!
//! let data = engine::synthesize_defaults(person);
//! assert_eq!(data["name"], "");
//!
//! let layout = engine::synthesize_layout(person, &LayoutPolicy::default());
//! assert_eq!(layout.elements().len(), 1);
//! ```

pub mod composer;
pub mod defaults;
pub mod layout;
pub mod loader;
pub mod pointer;
pub mod schema;

pub use composer::{compose, compose_with_policy, contains_ref, ResolvedSchema};
pub use defaults::synthesize_defaults;
pub use layout::{synthesize_layout, ControlPolicy, LayoutPolicy, PresentationRule};
pub use loader::{extract_fragments, index_catalogs, CatalogIndex, DuplicatePolicy};
pub use schema::{ObjectSchema, SchemaType};
