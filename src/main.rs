use clap::Parser;
use formsmith::adapters::api_handler::ApiState;
use formsmith::adapters::catalog_source::FileCatalogSource;
use formsmith::cli::{Cli, Command};
use formsmith::config::{watcher::CatalogWatcher, Settings};
use formsmith::engine::{synthesize_defaults, synthesize_layout, ObjectSchema};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so subcommand output stays clean JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    let source = Arc::new(FileCatalogSource::from_settings(&settings.catalog, &settings.root));
    let state = ApiState::new(Arc::new(RwLock::new(settings)), source.clone());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(state, source).await,
        Command::Compose => {
            let resolved = state.resolve().await?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
            Ok(())
        }
        Command::Defaults { object } => {
            let resolved = state.resolve().await?;
            let schema = ObjectSchema::new(resolved.require_object(&object)?)?;
            println!("{}", serde_json::to_string_pretty(&synthesize_defaults(schema))?);
            Ok(())
        }
        Command::Layout { object } => {
            let resolved = state.resolve().await?;
            let schema = ObjectSchema::new(resolved.require_object(&object)?)?;
            let policy = state.settings.read().await.layout.clone();
            println!(
                "{}",
                serde_json::to_string_pretty(&synthesize_layout(schema, &policy))?
            );
            Ok(())
        }
    }
}

async fn serve(state: ApiState, source: Arc<FileCatalogSource>) -> anyhow::Result<()> {
    let (host, port, watch) = {
        let settings = state.settings.read().await;
        (settings.server.host.clone(), settings.server.port, settings.catalog.watch)
    };

    info!("Starting formsmith on {}:{}", host, port);

    // A broken catalog must not keep the API from starting
    if let Err(e) = state.reload_session().await {
        error!("Failed to initialise session: {}", e);
    }

    let _watcher = if watch {
        let state_for_watcher = state.clone();
        let runtime = tokio::runtime::Handle::current();
        Some(CatalogWatcher::new(source.watched_paths(), move || {
            let state = state_for_watcher.clone();
            runtime.spawn(async move {
                match state.reload_session().await {
                    Ok(()) => info!("Catalogs reloaded successfully"),
                    Err(e) => error!("Failed to reload catalogs: {}", e),
                }
            });
        })?)
    } else {
        None
    };

    let app = formsmith::create_app(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
