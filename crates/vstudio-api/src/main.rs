//! Web server binary.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vstudio_api::{create_router, metrics, ApiConfig, AppState};
use vstudio_heygen::{HeygenClient, HeygenConfig};
use vstudio_store::Database;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    // Install rustls crypto provider (required for rustls 0.23+)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider was already installed");
    }

    info!("Starting vstudio-api");

    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

fn init_tracing() {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,vstudio=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ApiConfig::from_env();
    info!(
        host = %config.host,
        port = config.port,
        database = %config.database_path.display(),
        "API config loaded"
    );

    // The API key is mandatory; nothing works without it
    let heygen_config = HeygenConfig::from_env().context("Invalid HeyGen configuration")?;
    let heygen = HeygenClient::new(heygen_config).context("Failed to build HeyGen client")?;

    info!("Testing HeyGen API connection");
    heygen
        .check_connectivity()
        .await
        .context("Failed to connect to HeyGen API, check the API key and network")?;
    info!("HeyGen API connection OK");

    let db = Database::open(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;

    let metrics_handle = if config.metrics_enabled {
        let handle = metrics::init_metrics().context("Failed to install metrics recorder")?;
        info!("Prometheus metrics enabled at /metrics");
        Some(handle)
    } else {
        None
    };

    let state = AppState::new(config.clone(), heygen, db)
        .context("Failed to create application state")?;
    let app = create_router(state, metrics_handle);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
