// crates/server/src/main.rs
//! Weather collector server binary.
//!
//! Loads `.env`, parses flags, wires the OpenWeatherMap client into the job
//! runner and serves until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use weather_collector_core::upstream::OpenWeatherClient;
use weather_collector_server::{create_app, init_metrics, AppState, LogFormat, ServerConfig};

const DEFAULT_LOG_FILTER: &str = "warn,weather_collector_server=info,weather_collector_core=info";

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.compact().init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal in production.
    let _ = dotenvy::dotenv();
    let config = ServerConfig::parse();

    init_tracing(config.log_format);
    init_metrics();

    let provider = OpenWeatherClient::new(config.upstream_config())
        .context("failed to build OpenWeatherMap client")?;
    let pacer = config.build_pacer();
    let state = AppState::new(Arc::new(provider), pacer, config.start_mode);
    let app = create_app(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        %addr,
        upstream = %config.upstream_url,
        pacing = ?config.pacing,
        rate_limit_per_minute = config.rate_limit_per_minute,
        start_mode = ?config.start_mode,
        version = env!("CARGO_PKG_VERSION"),
        "Weather collector listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
