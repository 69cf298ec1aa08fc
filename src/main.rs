use anyhow::Context;
use std::net::{IpAddr, SocketAddr};
use tracing_subscriber::EnvFilter;

use mpesa_relay::{build_router, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Missing credentials are fatal: nothing gets served without them.
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("✅ Environment variables loaded successfully");
    tracing::info!(config = %config.get_config_info(), "🔧 M-Pesa configuration");

    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("HOST must be an IP address, got '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);

    let app_state = AppState::new(config).context("failed to initialize M-Pesa service")?;
    let app = build_router(app_state);

    start_server(app, addr).await
}

async fn start_server(app: axum::Router, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("🚀 M-Pesa backend running on {}", addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
