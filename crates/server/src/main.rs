use std::net::SocketAddr;

use tracing::info;

use visahub_server::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let addr: SocketAddr = std::env::var("VISAHUB_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:4000".to_string())
        .parse()?;

    let cfg = ServerConfig::from_env()?;

    info!(
        "Starting VisaHub API v{} on http://{} (database: {})",
        visahub_common::VERSION,
        addr,
        cfg.db_name
    );

    visahub_server::server::serve(addr, cfg).await
}
