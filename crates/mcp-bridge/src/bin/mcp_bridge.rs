//! `mcp-bridge`: CLI entry point for the transport-bridging proxy.
//!
//! Loads a declarative server list from an optional config file,
//! applies `PORT`/`HOST` env overrides, starts the admin HTTP surface,
//! and shuts down cleanly on `SIGINT`/`SIGTERM` — exit code 0 on clean
//! shutdown, 1 on startup failure.

use std::sync::Arc;

use clap::Parser;
use mcp_bridge::bootstrap::{self, BridgeConfig};
use mcp_bridge::{Bridge, admin};
use tracing::{error, info};

/// Transport-bridging proxy for the Model Context Protocol.
#[derive(Debug, Parser)]
#[command(name = "mcp-bridge", version, about = "Transport-bridging proxy for MCP")]
struct Cli {
    /// JSON config file declaring the admin listen address and initial servers.
    #[arg(long, value_name = "FILE")]
    config: Option<std::path::PathBuf>,

    /// Listen port for the admin HTTP surface. Overrides config file and `PORT`.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Listen interface for the admin HTTP surface. Overrides config file and `HOST`.
    #[arg(long, env = "HOST")]
    host: Option<String>,
}

#[tokio::main]
async fn main() {
    bootstrap::init_tracing();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match BridgeConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("failed to load config from {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => BridgeConfig::default(),
    }
    .with_env_overrides();

    if let Some(port) = cli.port {
        config.port = Some(port);
    }
    if let Some(host) = cli.host {
        config.host = Some(host);
    }

    if let Err(code) = run(config).await {
        std::process::exit(code);
    }
}

async fn run(config: BridgeConfig) -> Result<(), i32> {
    let bridge = Bridge::new();

    for server in config.servers.clone() {
        let id = server.id.clone();
        if let Err(e) = bridge.manager.register_server(server) {
            error!(server = %id, "failed to register declared server: {e}");
            return Err(1);
        }
        info!(server = %id, "registered server from config");
    }

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("failed to bind admin surface to {addr}: {e}");
            return Err(1);
        }
    };
    info!(%addr, "admin surface listening");

    let router = admin::router(Arc::clone(&bridge.manager));
    let server = axum::serve(listener, router).with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        error!("admin surface stopped with error: {e}");
        return Err(1);
    }

    info!("shutting down, stopping all servers");
    for snapshot in bridge.manager.servers().list() {
        let _ = bridge.manager.stop_server(&snapshot.config.id).await;
    }

    Ok(())
}

/// Resolves on `SIGINT` (Ctrl-C) or `SIGTERM`, whichever arrives first.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let Ok(mut signal) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) else {
            std::future::pending::<()>().await;
            return;
        };
        signal.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
