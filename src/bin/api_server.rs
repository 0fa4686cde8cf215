// API Server Binary Entry Point
//
// Purpose: Serve crop, fertilizer and yield recommendations over HTTP
// Usage: cargo run --features api --bin api_server

use crop_advisor::config::{ServerConfig, DEFAULT_LOG_FILTER};
use crop_advisor::{create_router, AppState};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // ARTIFACT_DIR defaults to ./artifacts, PORT to 5000
    let config = ServerConfig::from_env();

    tracing::info!("Configuration:");
    tracing::info!("  ARTIFACT_DIR: {:?}", config.artifact_dir);
    tracing::info!("  PORT: {}", config.port);

    // Refuses to start without the crop model and scaler
    let state = AppState::new(&config.artifact_dir)?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await?;

    Ok(())
}
