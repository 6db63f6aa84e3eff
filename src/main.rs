//! Gatekeeper Server: session-checked, ACL-gated access to object storage.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use gatekeeper_core::config::{AppConfig, ConfigLocation, RawConfig, location_from_env};
use gatekeeper_core::error::AppError;
use gatekeeper_core::traits::{ConfigSource, LinkIssuer};
use gatekeeper_service::{AuthFlow, ConfigReloader, GatewaySnapshot, SnapshotStore};

/// Everything loaded before logging is up.
struct Startup {
    config: AppConfig,
    snapshot: GatewaySnapshot,
    source: Arc<dyn ConfigSource>,
    raw: RawConfig,
}

#[tokio::main]
async fn main() {
    let startup = match load_configuration().await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&startup.config);

    if let Err(e) = run(startup).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Fetch, layer, and validate configuration; build the first snapshot.
async fn load_configuration() -> Result<Startup, AppError> {
    let location = location_from_env();
    let source = gatekeeper_storage::open_config_source(&ConfigLocation::parse(&location)?).await?;

    let raw = source.fetch().await?;
    let config = AppConfig::from_raw(&raw)?;
    let snapshot = GatewaySnapshot::from_config(&config)?;

    Ok(Startup {
        config,
        snapshot,
        source,
        raw,
    })
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
                .with_thread_ids(true)
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
async fn run(startup: Startup) -> Result<(), AppError> {
    let Startup {
        config,
        snapshot,
        source,
        raw,
    } = startup;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %source.location(),
        mode = %snapshot.mode(),
        acls = snapshot.acl().table().len(),
        "Starting Gatekeeper"
    );

    // ── Step 1: Object store ─────────────────────────────────────
    let client = gatekeeper_storage::build_client(&config.storage).await;
    let issuer: Arc<dyn LinkIssuer> = Arc::new(gatekeeper_storage::S3LinkIssuer::from_config(
        client,
        &config.storage,
    ));

    // ── Step 2: Snapshot store and flow ──────────────────────────
    let store = Arc::new(SnapshotStore::new(snapshot));
    let flow = Arc::new(AuthFlow::new(Arc::clone(&store), issuer));

    // ── Step 3: Shutdown channel and reloader ────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let reloader = ConfigReloader::new(
        Arc::clone(&source),
        Arc::clone(&store),
        &config.reload,
        Some(raw),
    );
    let reloader_handle = tokio::spawn(reloader.run(shutdown_rx));

    // ── Step 4: HTTP server ──────────────────────────────────────
    let state = gatekeeper_api::AppState::new(flow);
    let app = gatekeeper_api::build_app(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Gatekeeper listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 5: Wait for background tasks ────────────────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, reloader_handle).await.is_err() {
        tracing::warn!("Reloader did not stop within the shutdown grace period");
    }

    tracing::info!("Gatekeeper shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
