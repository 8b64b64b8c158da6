// ==========================================
// Foundry QC Tracker - server entry point
// ==========================================
// Configuration from the environment (see config::app_config),
// then one SQLite connection and the axum router.
// ==========================================

use std::sync::Arc;

use anyhow::Context;
use foundry_qc::app::{create_router, AppState};
use foundry_qc::config::AppConfig;
use foundry_qc::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} {}", foundry_qc::APP_NAME, foundry_qc::VERSION);
    tracing::info!("==================================================");

    let config = AppConfig::from_env()?;
    tracing::info!(
        db_path = %config.db_path,
        bind = %config.bind_addr,
        locale = %config.default_locale,
        "configuration loaded"
    );

    let state = AppState::new(&config.db_path, &config.default_locale)
        .with_context(|| format!("cannot open database {}", config.db_path))?;
    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
    }
}
