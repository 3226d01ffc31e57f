use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Compose JSON Schema catalogs and derive default data and form layouts
#[derive(Parser, Debug, Clone)]
#[command(name = "formsmith", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "FORMSMITH_CONFIG", default_value = "formsmith.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "FORMSMITH_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "FORMSMITH_PORT")]
    pub port: Option<u16>,

    /// Field catalog file
    #[arg(long, env = "FORMSMITH_FIELDS")]
    pub fields: Option<PathBuf>,

    /// Object catalog file
    #[arg(long, env = "FORMSMITH_OBJECTS")]
    pub objects: Option<PathBuf>,

    /// Object schema the form session starts with
    #[arg(long, env = "FORMSMITH_OBJECT")]
    pub object: Option<String>,

    /// Reload the session when catalog files change
    #[arg(long, env = "FORMSMITH_WATCH", num_args = 0..=1, default_missing_value = "true")]
    pub watch: Option<bool>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Print the composed, fully dereferenced schema
    Compose,
    /// Print the default data for an object schema
    Defaults {
        /// Object name, e.g. Base_InventoryInterface
        object: String,
    },
    /// Print the layout for an object schema
    Layout {
        /// Object name, e.g. Base_InventoryInterface
        object: String,
    },
}
