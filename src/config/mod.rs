use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod validator;
pub mod watcher;

use crate::cli::Cli;
use crate::engine::{DuplicatePolicy, LayoutPolicy};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub layout: LayoutPolicy,
    /// Directory relative catalog paths are resolved against
    #[serde(skip)]
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Where the field and object catalogs live and how they are read
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default = "default_fields_path")]
    pub fields_path: String,
    #[serde(default = "default_objects_path")]
    pub objects_path: String,
    /// Top-level key holding the field fragments
    #[serde(default = "default_fields_key")]
    pub fields_key: String,
    /// Top-level key holding the object fragments
    #[serde(default = "default_objects_key")]
    pub objects_key: String,
    /// Optional directory with `fields/` and `objects/` holding one fragment per file
    #[serde(default)]
    pub fragments_dir: Option<String>,
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
    /// Object schema the session starts with
    #[serde(default)]
    pub active_object: Option<String>,
    /// Re-initialise the session when catalog files change
    #[serde(default)]
    pub watch: bool,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            fields_path: default_fields_path(),
            objects_path: default_objects_path(),
            fields_key: default_fields_key(),
            objects_key: default_objects_key(),
            fragments_dir: None,
            duplicates: DuplicatePolicy::default(),
            active_object: None,
            watch: false,
        }
    }
}

fn default_fields_path() -> String {
    "catalog/Fields.json".to_string()
}

fn default_objects_path() -> String {
    "catalog/Schemas.json".to_string()
}

fn default_fields_key() -> String {
    "Fields".to_string()
}

fn default_objects_key() -> String {
    "Schemas".to_string()
}

impl Settings {
    /// Create settings from CLI arguments (config file plus CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let config_path = &cli.config;
        let root = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut settings = Self::load(File::from(config_path.clone()).required(false), root)?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);

        Self::validate(&settings)?;
        Ok(settings)
    }

    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = Path::new(root).join("formsmith");
        let settings = Self::load(File::from(config_path).required(false), Path::new(root))?;
        Self::validate(&settings)?;
        Ok(settings)
    }

    fn load<S>(source: S, root: &Path) -> Result<Self, anyhow::Error>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = Config::builder()
            .add_source(source)
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;
        settings.root = root.to_path_buf();
        Ok(settings)
    }

    fn validate(settings: &Settings) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(settings).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(fields) = &cli.fields {
            self.catalog.fields_path = from_cwd(fields);
        }
        if let Some(objects) = &cli.objects {
            self.catalog.objects_path = from_cwd(objects);
        }
        if let Some(object) = &cli.object {
            self.catalog.active_object = Some(object.clone());
        }
        if let Some(watch) = cli.watch {
            self.catalog.watch = watch;
        }
    }
}

/// CLI paths are relative to the working directory, not the config root.
fn from_cwd(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    absolute.to_string_lossy().into_owned()
}
