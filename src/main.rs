use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use barangay_care_bff::{app, config, AppState};

#[derive(Parser)]
#[command(name = "barangay-care-bff")]
#[command(about = "Session gate and API proxy in front of the barangay healthcare API")]
#[command(version)]
struct Args {
    #[arg(long, help = "Address to bind (overrides HOST)")]
    host: Option<String>,

    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Upstream API base URL (overrides API_BASE_URL)")]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up API_BASE_URL, APP_ENV, etc.
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let mut config = config::config().clone();
    if let Some(upstream) = args.upstream.as_deref() {
        config = config.with_upstream(upstream);
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let default_filter = if config.api.enable_request_logging {
        "info,tower_http=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    tracing::info!(
        "Starting barangay-care-bff in {:?} mode, upstream {}",
        config.environment,
        config.upstream.base_url
    );

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config).context("failed to build upstream client")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
