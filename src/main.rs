use anyhow::{Context, Result};
use drivedrop::api::{create_router, ApiState};
use drivedrop::config::{self, DrivedropConfig};
use drivedrop::oauth::AuthFlow;
use drivedrop::token_store::TokenStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drivedrop=info".into()),
        )
        .init();

    info!("drivedrop starting...");

    // Optional config file as the first argument
    let config_path = std::env::args().nth(1);
    let config = match &config_path {
        Some(path) => config::load_config(path)
            .map_err(|e| anyhow::anyhow!("loading config {path}: {e}"))?,
        None => DrivedropConfig::default(),
    };

    let (client_id, client_secret) = config::client_credentials_from_env().context(
        "DRIVEDROP_CLIENT_ID and DRIVEDROP_CLIENT_SECRET environment variables are required",
    )?;

    info!(
        bind_addr = %config.server.bind_addr,
        tokens_dir = %config.storage.tokens_dir,
        staging_dir = %config.storage.staging_dir,
        "configuration loaded"
    );

    // Token store directory is created here, at process start
    let store = Arc::new(TokenStore::open(config.storage.tokens_dir.clone()).await?);

    let flow = Arc::new(AuthFlow::new(
        config.oauth.provider_config(client_id, client_secret),
        Arc::clone(&store),
        Duration::from_secs(config.oauth.request_timeout_seconds),
    )?);

    let state = ApiState {
        flow,
        staging_dir: PathBuf::from(&config.storage.staging_dir),
    };
    let router = create_router(state, &config.server.cors_origin, config.server.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .context("Failed to bind API port")?;
    info!(addr = %config.server.bind_addr, "drivedrop listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "API server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    info!("drivedrop stopped");

    Ok(())
}
