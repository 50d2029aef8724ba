//! egress-gateway
//!
//! ```text
//!     Caller                              GATEWAY                                 Target
//!     ──────  GET /?url=..&cacheTtl=..   ┌───────────────────────────────────┐
//!             X-Proxy-Secret: ...   ───▶ │ method → secret → url → headers   │
//!                                        │        → edge cache? ─────────────┼──▶  GET url
//!                                        │                                   │     Host: target
//!     ◀─── status, body, X-Proxied,  ─── │ compose response headers          │◀──  response
//!          X-Proxy-Version, X-Cache-TTL  └───────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use egress_gateway::config::load_config;
use egress_gateway::lifecycle::{signals, Shutdown};
use egress_gateway::observability::{logging, metrics};
use egress_gateway::GatewayServer;

#[derive(Parser)]
#[command(name = "egress-gateway")]
#[command(about = "Authenticated HTTP forwarding gateway", long_about = None)]
struct Cli {
    /// Path to a TOML config file. PROXY_* environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);

    tracing::info!(version = %config.version, "egress-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        edge_cache = config.edge_cache.enabled,
        metrics = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = GatewayServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
