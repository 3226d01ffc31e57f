//! Catalog sources: files on disk or catalogs held in memory.
//!
//! A file source reads two catalog documents (fields and objects) and, when a
//! fragments directory is configured, one extra fragment per file from
//! `<dir>/fields/*` and `<dir>/objects/*`. JSON, YAML and TOML are accepted,
//! picked by file extension.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::CatalogSettings;
use crate::domain::{CatalogSource, Catalogs, EngineError, Namespace};
use crate::engine::extract_fragments;

pub struct FileCatalogSource {
    fields_path: PathBuf,
    objects_path: PathBuf,
    fields_key: String,
    objects_key: String,
    fragments_dir: Option<PathBuf>,
}

impl FileCatalogSource {
    /// Build a source from settings; relative paths are resolved against `root`.
    pub fn from_settings(settings: &CatalogSettings, root: &Path) -> Self {
        Self {
            fields_path: root.join(&settings.fields_path),
            objects_path: root.join(&settings.objects_path),
            fields_key: settings.fields_key.clone(),
            objects_key: settings.objects_key.clone(),
            fragments_dir: settings.fragments_dir.as_ref().map(|dir| root.join(dir)),
        }
    }

    /// Every path a watcher should observe for this source.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.fields_path.clone(), self.objects_path.clone()];
        paths.extend(self.fragments_dir.clone());
        paths
    }

    async fn load_catalog(&self, path: &Path, key: &str) -> Result<Vec<Value>, EngineError> {
        let document = read_document(path).await?;
        extract_fragments(document, key).map_err(|e| match e {
            EngineError::MalformedInput { reason, .. } => EngineError::Parse {
                path: path.to_path_buf(),
                reason: format!("{} ({})", reason, key),
            },
            other => other,
        })
    }

    async fn load_fragment_dir(
        &self,
        dir: &Path,
        namespace: Namespace,
    ) -> Result<Vec<Value>, EngineError> {
        let pattern = format!("{}/{}/*", dir.display(), namespace);
        let entries = glob::glob(&pattern).map_err(|e| EngineError::Parse {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut fragments = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => {
                    if document_format(&path).is_none() {
                        continue;
                    }
                    fragments.push(read_document(&path).await?);
                }
                Err(e) => warn!("Failed to read glob entry: {}", e),
            }
        }
        Ok(fragments)
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn load(&self) -> Result<Catalogs, EngineError> {
        let mut catalogs = Catalogs {
            fields: self.load_catalog(&self.fields_path, &self.fields_key).await?,
            objects: self.load_catalog(&self.objects_path, &self.objects_key).await?,
        };

        if let Some(dir) = &self.fragments_dir {
            catalogs
                .fields
                .extend(self.load_fragment_dir(dir, Namespace::Fields).await?);
            catalogs
                .objects
                .extend(self.load_fragment_dir(dir, Namespace::Objects).await?);
        }

        info!(
            "Loaded {} field and {} object fragments",
            catalogs.fields.len(),
            catalogs.objects.len()
        );
        Ok(catalogs)
    }
}

/// Catalogs handed over by the caller
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogSource {
    catalogs: Catalogs,
}

impl InMemoryCatalogSource {
    pub fn new(catalogs: Catalogs) -> Self {
        Self { catalogs }
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalogSource {
    async fn load(&self) -> Result<Catalogs, EngineError> {
        Ok(self.catalogs.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Json,
    Yaml,
    Toml,
}

fn document_format(path: &Path) -> Option<DocumentFormat> {
    match path.extension().and_then(|e| e.to_str())? {
        "json" => Some(DocumentFormat::Json),
        "yaml" | "yml" => Some(DocumentFormat::Yaml),
        "toml" => Some(DocumentFormat::Toml),
        _ => None,
    }
}

async fn read_document(path: &Path) -> Result<Value, EngineError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_document(path, &content)
}

fn parse_document(path: &Path, content: &str) -> Result<Value, EngineError> {
    let parse_error = |reason: String| EngineError::Parse {
        path: path.to_path_buf(),
        reason,
    };
    match document_format(path) {
        Some(DocumentFormat::Yaml) => {
            serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))
        }
        Some(DocumentFormat::Toml) => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
        // Unknown extensions are read as JSON
        Some(DocumentFormat::Json) | None => {
            serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))
        }
    }
}
