//! Grade relay service.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                   GRADE RELAY                    │
//!  POST /student  │  ┌──────────┐   ┌──────────┐   ┌─────────────┐   │   POST /calculateGrades
//!  ───────────────┼─▶│   http   │──▶│ student  │──▶│ downstream  │───┼──────────────────────▶ data-aggregation
//!                 │  │  server  │   │ handler  │   │   client    │   │                        service
//!  text/plain     │  └──────────┘   └──────────┘   └─────────────┘   │   JSON grade maps
//!  ◀──────────────┼──────────────────── render ◀────────────────────┼◀──────────────────────
//!                 │                                                  │
//!                 │  config (TOML + reload) · observability · lifecycle
//!                 └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use grade_relay::config::{load_config, ConfigWatcher, RelayConfig};
use grade_relay::lifecycle::{shutdown_signal, Shutdown};
use grade_relay::observability::{logging, metrics};
use grade_relay::HttpServer;

#[derive(Parser)]
#[command(name = "grade-relay")]
#[command(about = "Relays student grades to the data aggregation service", long_about = None)]
struct Args {
    /// TOML configuration file; watched for downstream changes.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!("grade-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        downstream = %config.downstream.endpoint(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher alive for the lifetime of the server.
    let (config_updates, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(w) => (updates, Some(w)),
                Err(e) => {
                    tracing::warn!(error = %e, "Config hot reload disabled");
                    (updates, None)
                }
            }
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (updates, None)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
