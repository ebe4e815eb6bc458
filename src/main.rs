//! Main entry point for the text-to-image serving API

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use txt2img_api::{
    api,
    config::Settings,
    engine::{capabilities, local::LocalEngineLoader, EngineManager},
    storage::OutputStore,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::load()?;
    settings.validate()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone()));

    if settings.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }

    info!("Starting text-to-image serving API");
    info!(
        "Loaded configuration: server={}:{}, model_path={}",
        settings.server.host, settings.server.port, settings.engine.model_path
    );

    // Startup banner: accelerator probe is observability only, the engine
    // itself loads on the first generation request.
    capabilities::probe_and_log();
    info!("Engine loads on first /generate request");

    // Initialize output store
    let store = Arc::new(OutputStore::new(&settings.storage.output_dir));
    store.ensure_dir().await?;

    // Initialize engine lifecycle manager
    let engine = Arc::new(EngineManager::new(
        Box::new(LocalEngineLoader),
        settings.engine.clone(),
    ));

    // Create application state
    let app_state = Arc::new(AppState {
        settings: settings.clone(),
        engine,
        store,
    });

    // Build the router
    let app = api::routes::create_router(app_state);

    // Start the server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
