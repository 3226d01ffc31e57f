use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod error;
pub mod layout;

pub use error::EngineError;
pub use layout::{ControlOptions, LayoutElement};

/// The two raw catalogs the engine composes from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalogs {
    #[serde(default)]
    pub fields: Vec<Value>,
    #[serde(default)]
    pub objects: Vec<Value>,
}

/// Catalog namespaces inside the combined document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Fields,
    Objects,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Fields => "fields",
            Namespace::Objects => "objects",
        }
    }

    /// Reference prefix for fragments of this namespace, e.g. `#/definitions/fields/`
    pub fn ref_prefix(&self) -> String {
        format!("#/definitions/{}/", self.as_str())
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of field and object catalogs
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load(&self) -> Result<Catalogs, EngineError>;
}
