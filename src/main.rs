//! Redirection edge
//!
//! Serves a site from an upstream and lets an external redirection service
//! answer requests with redirects or 410 Gone.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http server ──▶ interception (decision) ──▶ upstream site
//!                       (request id,        │        ▲                  │
//!                        tracing, TLS)      │ match  │ rule             │
//!                                           ▼        │                  │
//!                                    redirection service ◀── log ──┐   │
//!                                                                   │   ▼
//!     Client Response ◀─────────────────────────── interception (logging)
//!
//!     Cross-cutting: config store + watcher, metrics, graceful shutdown
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use redirection_edge::config::{load_config, ConfigStore, ConfigWatcher, EdgeConfig};
use redirection_edge::http::HttpServer;
use redirection_edge::lifecycle::Shutdown;
use redirection_edge::net::tls::load_tls_config;
use redirection_edge::observability::{logging, metrics};
use redirection_edge::redirection::SocketTransport;

#[derive(Parser)]
#[command(name = "redirection-edge")]
#[command(about = "Edge server consulting a redirection service before serving a site", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EdgeConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!("redirection-edge v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        project_configured = !config.redirection.project_key.is_empty(),
        tls = config.listener.tls.is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = Arc::new(ConfigStore::new(config.clone()));

    // Held for the lifetime of the process; dropping it stops reloads.
    let _watcher = match &cli.config {
        Some(path) => match ConfigWatcher::new(path, store.clone()).run() {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!(error = %e, "Config hot reload disabled");
                None
            }
        },
        None => None,
    };

    let transport = Arc::new(SocketTransport::new(Duration::from_millis(
        config.timeouts.connect_ms,
    )));
    let server = HttpServer::new(store, transport);

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    match &config.listener.tls {
        Some(tls) => {
            let addr: SocketAddr = config.listener.bind_address.parse()?;
            let rustls = load_tls_config(tls).await?;
            server.run_tls(addr, rustls, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
