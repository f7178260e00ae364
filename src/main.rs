//! Location check-in service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client (base64 body)
//!     ──────────────────────▶ TraceLayer ─▶ timeouts ─▶ trace_context ─▶ seal ─▶ router
//!                                                       (Logger +        (decode)   │
//!                                                        traceparent)              ▼
//!                                                                          /checkin ─▶ VisitRecorder ─▶ SQLite
//!                                                                          /currents   (stub)
//!                                                                          /checkout   (stub)
//!     Client (base64 body)
//!     ◀────────────────────────────────────────────────────────────── seal (encode) ◀──┘
//! ```
//!
//! This binary is the composition root: it owns the base logger and the store
//! handle and wires both into the HTTP layer.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use checkin_service::config::ServiceConfig;
use checkin_service::http::HttpServer;
use checkin_service::lifecycle::Shutdown;
use checkin_service::observability::{init_logging, Logger};
use checkin_service::store::SqliteVisitStore;

#[derive(Parser)]
#[command(name = "checkin-service")]
#[command(about = "Location check-in service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let config = ServiceConfig::from_env_and_file(cli.config.as_deref())?;
    init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address(),
        read_timeout_secs = config.timeouts.read_secs,
        write_timeout_secs = config.timeouts.write_secs,
        "Configuration loaded"
    );

    let hostname = sys_info::hostname().unwrap_or_else(|_| "unknown".to_string());
    let logger = Logger::new(&hostname);

    let store = SqliteVisitStore::connect(&config.database).await?;
    if config.database.create_schema {
        store.ensure_schema().await?;
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown.clone().listen_for_signals());

    let server = HttpServer::new(config, logger, Arc::new(store.clone()));
    server.run(listener, server_shutdown).await?;

    store.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
