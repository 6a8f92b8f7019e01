//! # PawMart API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load config ──► open SQLite (migrations) ──► bind ──► serve            │
//! │                                                          │              │
//! │                                   Ctrl+C / SIGTERM ──────┘ graceful     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use pawmart_api::{router, ApiConfig, AppState};
use pawmart_db::{Database, DbConfig};

const DEFAULT_LOG_FILTER: &str = "pawmart_api=info,pawmart_db=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(true)
        .init();

    info!("Starting PawMart API server...");

    let config = ApiConfig::load().context("failed to load configuration")?;
    if config.uses_dev_secret() {
        warn!("Using the development JWT secret with an in-memory database");
    }
    info!(
        address = %config.bind_address(),
        database = %config.database_path,
        "Configuration loaded"
    );

    let db_config = if config.is_memory_database() {
        DbConfig::in_memory()
    } else {
        DbConfig::new(&config.database_path).max_connections(config.database_max_connections)
    };
    let db = Database::new(db_config)
        .await
        .context("failed to open database")?;

    let address = config.bind_address();
    let state = AppState::new(db.clone(), config);
    let app = router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(%address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM. A handler that fails to install never
/// resolves, leaving the other one in charge.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
