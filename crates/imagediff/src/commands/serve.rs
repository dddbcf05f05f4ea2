use anyhow::{Context, Result};
use imagediff::config::ResolvedRunConfig;
use imagediff::server::{AppState, build_router};
use tracing::info;

/// `imagediff serve` — HTTP service until Ctrl-C.
pub async fn serve(config: ResolvedRunConfig) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    info!(
        addr = %listener.local_addr()?,
        algorithm = config.diff.algorithm.name(),
        threshold = config.diff.threshold,
        "listening"
    );

    axum::serve(listener, build_router(AppState::from(&config)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
