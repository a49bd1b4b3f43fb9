//! Form actions server.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Logging level (e.g., `debug`, `form_actions=debug`)
//! - `LOG_FORMAT`: `text` (default) | `json`
//! - `APP_HOST`, `APP_PORT`: bind address (default: `0.0.0.0:3000`)
//! - see [`form_actions::config`] for the remaining variables

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use form_actions::api::{AppState, create_router};
use form_actions::{AppConfig, FormActions, LogFormat};

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();
    let log_format = config
        .as_ref()
        .map_or(LogFormat::default(), |config| config.log_format);
    init_tracing(log_format);

    let config = match config {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "Configuration error");
            std::process::exit(1);
        }
    };

    tracing::info!(
        max_tasks = config.max_tasks,
        uniqueness_timeout_ms = u64::try_from(config.uniqueness_timeout.as_millis()).unwrap_or(u64::MAX),
        reserved_usernames = config.reserved_usernames.len(),
        "Configuration loaded"
    );

    let state = AppState::new(FormActions::from_config(&config));
    let application = create_router(state).layer(TraceLayer::new_for_http());

    let address: SocketAddr = match config.bind_address().parse() {
        Ok(address) => address,
        Err(error) => {
            tracing::error!(%error, "Invalid server address: {}", config.bind_address());
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "Failed to bind to address {}", address);
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    if let Err(error) = axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "form_actions=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

/// Completes on SIGINT (Ctrl+C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
