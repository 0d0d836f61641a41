//! Scoreline Server
//!
//! Follows live football matches and keeps a chat message per match
//! current, announcing goals, cards and phase changes as they happen.

mod adapters;
mod api;
mod config;
mod server;
mod shutdown;
mod state;

use adapters::{FootballProvider, WebhookSink};
use clap::Parser;
use config::{ConfigLoader, LoadedConfig};
use scoreline_core::config::{ConfigStore, MonitorConfig};
use scoreline_core::directory::{FixtureDirectory, JsonFixtureDirectory};
use scoreline_core::events::TaskFinishedReceiver;
use scoreline_core::fetcher::SnapshotFetcher;
use scoreline_core::processors::Supervisor;
use scoreline_core::render::Renderer;
use scoreline_sdk::client::{FootballClient, WebhookClient};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Scoreline - live football match follower
#[derive(Parser, Debug)]
#[command(name = "scoreline-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./scoreline.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting scoreline-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let directory = load_directory(&loaded_config).await?;
    let (supervisor, finished_rx, monitor_store) = build_supervisor(&loaded_config, directory)?;

    // Supervisor reaps finished tasks until shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let supervisor_handle = tokio::spawn({
        let supervisor = supervisor.clone();
        async move { supervisor.run(shutdown_rx, finished_rx).await }
    });

    // Spawn config reload handler (listens for SIGHUP)
    let reload_notify = spawn_config_reload_handler(config_loader, monitor_store);

    // Build the router
    let state = AppState::new(supervisor, loaded_config.channels);
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Signal the config reload handler to stop
    reload_notify.notify_one();

    tracing::info!("Stopping tracking tasks...");
    shutdown_tx.send_replace(true);
    if let Err(e) = supervisor_handle.await {
        tracing::error!("Supervisor task failed: {}", e);
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,scoreline_core=debug,reqwest=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn load_directory(config: &LoadedConfig) -> anyhow::Result<Arc<dyn FixtureDirectory>> {
    let Some(path) = &config.fixtures_path else {
        tracing::warn!("No fixture directory configured; following by team is disabled");
        return Ok(Arc::new(JsonFixtureDirectory::default()));
    };

    let directory = JsonFixtureDirectory::load(path).await.map_err(|e| {
        tracing::error!("Failed to load fixture directory {:?}: {}", path, e);
        e
    })?;
    tracing::info!(teams = directory.len(), "Fixture directory loaded from {:?}", path);
    Ok(Arc::new(directory))
}

fn build_supervisor(
    config: &LoadedConfig,
    directory: Arc<dyn FixtureDirectory>,
) -> anyhow::Result<(Supervisor, TaskFinishedReceiver, ConfigStore<MonitorConfig>)> {
    let provider_http = reqwest::Client::builder()
        .timeout(config.provider.timeout)
        .build()?;
    let football = FootballClient::new(
        config.provider.base_url.clone(),
        config.provider.api_key.clone(),
        config.provider.timezone.clone(),
    )
    .with_http_client(provider_http);

    let webhook_http = reqwest::Client::builder()
        .timeout(config.provider.timeout)
        .build()?;
    let sink = WebhookSink::new(
        WebhookClient::new().with_http_client(webhook_http),
        config.channels.webhooks.clone(),
    );

    let mut fetcher = SnapshotFetcher::new(Arc::new(FootballProvider::new(football)));
    if let Some(dir) = &config.provider.snapshot_dump_dir {
        tracing::info!("Dumping fetched payloads to {:?}", dir);
        fetcher = fetcher.with_dump_dir(dir.clone());
    }

    let monitor_store = ConfigStore::new(config.monitor.clone());
    let (supervisor, finished_rx) = Supervisor::new(
        fetcher,
        Arc::new(sink),
        Renderer::new(config.branding.clone()),
        directory,
        monitor_store.clone(),
    );
    Ok((supervisor, finished_rx, monitor_store))
}
