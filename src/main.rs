use anyhow::Context;
use neurosync::api::{self, app_state::AppState};
use neurosync::config::loader::ConfigLoader;
use neurosync::observability::init_tracing;
use neurosync::services::create_llm_client;
use neurosync::storage::StorageFactory;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().context("failed to load configuration")?;
    ConfigLoader::validate(&config).context("invalid configuration")?;

    let _log_guard = init_tracing(&config.logging);
    info!(
        "Starting {} ({} environment)...",
        config.app_name, config.environment
    );

    let repositories = StorageFactory::create(&config.database)
        .await
        .context("failed to initialise storage")?;
    info!("Storage initialized ({:?} backend)", config.database.backend);

    let llm_client = create_llm_client(&config.llm).context("failed to create LLM client")?;
    info!("LLM client initialized: {}", config.llm.base_url);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app_state = AppState::new(config, repositories, llm_client);
    let router = api::initialize_api(app_state).await?;
    info!("API router created with observability endpoints");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
