//! Chat hub server binary.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chat_hub::adapters::{build_router, GlobalHub, HubManager, RoomReaper, WebSocketState};
use chat_hub::config::{AppConfig, ConfigError, ServerConfig};

/// Errors that stop the server.
#[derive(Debug, Error)]
enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = AppConfig::load()?;
    config.validate().map_err(ConfigError::from)?;

    init_tracing(&config.server);

    let hub_manager = Arc::new(HubManager::new(config.hub.clone()));
    GlobalHub::instance_with(&config.hub);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reaper = RoomReaper::new(Arc::clone(&hub_manager));
    let reaper_task = tokio::spawn(async move { reaper.run(shutdown_rx).await });

    let app = build_router(WebSocketState::new(hub_manager), &config.server);

    let addr = config.server.bind_addr().map_err(ConfigError::from)?;
    let listener = TcpListener::bind(addr).await.map_err(ServerError::Bind)?;
    tracing::info!(%addr, environment = ?config.server.environment, "Chat hub listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    let _ = shutdown_tx.send(true);
    if let Err(e) = reaper_task.await {
        tracing::warn!(error = %e, "Room reaper task failed");
    }

    tracing::info!("Chat hub stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if server.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping");
}
