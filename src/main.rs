//! Supermarket Gateway: authenticated edge proxy for the identity,
//! catalog, and ordering services.
//!
//! Main entry point that wires all crates together and starts the server.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::oneshot;
use tracing_subscriber::{EnvFilter, fmt};

use gateway_api::state::AppState;
use gateway_auth::reset::TracingNotifier;
use gateway_core::config::AppConfig;
use gateway_rpc::ServiceProxy;

/// Command-line flags.
#[derive(Debug, Parser)]
#[command(name = "gateway-server", version, about = "Supermarket edge gateway")]
struct Args {
    /// Directory holding `default.toml` and per-environment overlays.
    #[arg(long, env = "GATEWAY_CONFIG_DIR", default_value = "config")]
    config_dir: String,

    /// Environment overlay to apply on top of the defaults.
    #[arg(long, env = "GATEWAY_ENV", default_value = "development")]
    env: String,

    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match AppConfig::load(&args.config_dir, &args.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Supermarket Gateway v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Backend links ────────────────────────────────────
    for (name, endpoint) in config.services.endpoints() {
        tracing::info!(service = name, address = %endpoint.address(), "Backend configured");
    }
    let proxy = Arc::new(ServiceProxy::from_config(&config.services));

    // Unreachable backends are reported but do not block startup; calls
    // against them fail until they come up.
    for (service, e) in proxy.warm_up().await {
        tracing::warn!(service = %service, error = %e, "Backend not reachable at startup");
    }

    // ── Step 2: Build and start HTTP server ──────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let state = AppState::new(config, proxy, Arc::new(TracingNotifier));
    let app = gateway_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Gateway listening on {}", addr);

    // ── Step 3: Graceful shutdown ────────────────────────────────
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, draining in-flight requests...");
            let _ = signalled_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    // In-flight calls may be waiting on slow backends; stop waiting once
    // the grace period after the signal is over.
    let grace_elapsed = async move {
        if signalled_rx.await.is_ok() {
            tokio::time::sleep(grace).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = &mut server => result.context("Server error")?,
        _ = grace_elapsed => {
            tracing::warn!(grace_seconds = grace.as_secs(), "Grace period elapsed, forcing shutdown");
        }
    }

    tracing::info!("Gateway shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
