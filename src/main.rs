//! Todo Service
//!
//! A small CRUD service for todo records over SQLite, built with Tokio
//! and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ timeout ─▶ panic recovery
//!                                                            │
//!                                                            ▼
//!                                   body limit ─▶ access log (body tee)
//!                                                            │
//!                                                            ▼
//!                                                     todos handlers
//!                                                            │
//!     Client Response                                        ▼
//!     ◀────────────── {"error": ..} / JSON ◀──── storage gateway ─▶ todo.db
//!
//!     Cross-cutting: config (TOML + PORT), observability (stdout,
//!     access.log, error.log), lifecycle (startup, signals, shutdown)
//! ```

use std::path::PathBuf;

use clap::Parser;

use todo_service::config::resolve_config;
use todo_service::lifecycle::{Service, Shutdown};
use todo_service::observability::{init_logging, LogFiles};

#[derive(Parser)]
#[command(name = "todo-service")]
#[command(about = "CRUD HTTP service for todo records", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref())?;

    // Log files first: every later failure should land in error.log
    let log_files = LogFiles::open(&config.logging)?;
    init_logging(&config.logging, &log_files)?;

    tracing::info!("todo-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        database = %config.database.path,
        access_log = %config.logging.access_log,
        error_log = %config.logging.error_log,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let service = match Service::bootstrap(config, &log_files).await {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    let shutdown = Shutdown::new();
    let database = service.run(shutdown.subscribe()).await?;

    tracing::info!(database = ?database, "Shutdown complete");
    Ok(())
}
