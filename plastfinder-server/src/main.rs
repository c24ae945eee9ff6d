use anyhow::Context;
use plastfinder_server::{init_tracing, json_logs_requested, serve, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(json_logs_requested())?;

    let config = ServerConfig::from_env().context("loading configuration")?;
    let state = AppState::from_config(&config);

    serve(&config, state, shutdown_signal()).await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
