// This is the entry point for the image converter service.
// The lib.rs file exposes the same pipeline for embedding and tests.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use image_converter_lib::{AppState, ServerConfig, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_target(false)       // Remove module path
        .with_writer(std::io::stdout)
        .compact()
        .init();

    info!("=== Image converter starting ===");

    let config = ServerConfig::from_env().context("invalid configuration")?;
    let bind_addr = config.bind_addr;
    let retention = config.retention;

    let state = AppState::new(config)
        .await
        .context("failed to initialize application state")?;

    let swept = state.storage().sweep_expired(retention).await;
    info!(
        "Storage root {} ready ({} stale batches removed, retention {}s)",
        state.storage().path().display(),
        swept,
        retention.as_secs()
    );

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Image converter stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
