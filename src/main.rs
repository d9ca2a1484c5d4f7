//! Server-side rendering web server.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────────┐
//!                     │                        SSR SERVER                        │
//!                     │                                                          │
//!   Client Request    │  ┌──────────┐    ┌───────────┐    ┌──────────────┐       │
//!   ──────────────────┼─▶│  http    │───▶│  statics  │───▶│   routing    │       │
//!                     │  │  server  │    │ public/   │    │ route table  │       │
//!                     │  └──────────┘    │ static/   │    └──────┬───────┘       │
//!                     │                  └───────────┘           │               │
//!                     │                                          ▼               │
//!                     │                  ┌───────────┐    ┌──────────────┐       │
//!                     │                  │  locale   │───▶│ render cache │       │
//!                     │                  │ resolve   │    └──────┬───────┘       │
//!                     │                  └───────────┘           │ miss          │
//!                     │                                          ▼               │
//!   Client Response   │                                   ┌──────────────┐       │
//!   ◀─────────────────┼───────────────────────────────────│   renderer   │       │
//!                     │                                   │views+template│       │
//!                     │                                   └──────────────┘       │
//!                     │  ┌────────────────────────────────────────────────────┐  │
//!                     │  │ config · assets · lifecycle · observability        │  │
//!                     │  └────────────────────────────────────────────────────┘  │
//!                     └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use ssr_server::config::{load_config, ServerConfig};
use ssr_server::lifecycle::{launch, prepare_config, serve_until_signal, wait_for_termination};
use ssr_server::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "ssr-server", version, about = "Server-side rendering web server")]
struct Cli {
    /// Path to a TOML config file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("ssr-server: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => ServerConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("ssr-server v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match prepare_config(config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (server, listener) = match launch(config).await {
        Ok(ready) => ready,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    match serve_until_signal(server, listener, wait_for_termination()).await {
        Ok(Some(signal)) => {
            tracing::warn!("Received {} - terminating", signal);
            return ExitCode::FAILURE;
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(error = %e, "Server error");
            return ExitCode::FAILURE;
        }
    }

    tracing::info!("Server stopped");
    ExitCode::SUCCESS
}
