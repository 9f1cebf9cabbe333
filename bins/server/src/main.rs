//! Fish server
//!
//! Main entry point for the Fish upload service.

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fish_api::{AppState, create_router};
use fish_core::reaper::{Reaper, ReaperConfig};
use fish_core::storage::{StorageConfig, StorageService};
use fish_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let storage = StorageService::new(
        StorageConfig::new(config.storage.root.clone())
            .with_max_upload_bytes(config.storage.max_upload_bytes),
    );
    storage.ensure_root().await?;
    info!(
        root = %config.storage.root.display(),
        max_upload_bytes = config.storage.max_upload_bytes,
        "Storage ready"
    );

    let shutdown = CancellationToken::new();
    let reaper = match config.expiry() {
        Some(expiry) => {
            let reaper_config = ReaperConfig::new(expiry).with_interval(config.sweep_interval());
            Some(Reaper::new(config.storage.root.clone(), reaper_config).spawn(shutdown.clone()))
        }
        None => {
            info!("Expiry disabled, uploads are kept forever");
            None
        }
    };

    let app = create_router(AppState::new(storage), config.server.static_dir.as_deref());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    if let Some(handle) = reaper {
        if let Err(e) = handle.await {
            warn!(error = %e, "Reaper task ended abnormally");
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM, then cancels `token`.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
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
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
    token.cancel();
}
