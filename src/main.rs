// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use simplefit_gateway::{
    api::router,
    config::{ConfigError, GatewayConfig, LogFormat},
    state::AppState,
    storage::{ExerciseStore, IdentityStore, MemoryStore, RedbStore, StoreError},
    telemetry,
};
use tokio_util::sync::CancellationToken;

/// Anything that stops the gateway from coming up.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("document store error: {0}")]
    Store(#[from] StoreError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing(LogFormat::from_env());

    if let Err(err) = run().await {
        tracing::error!(error = %err, "SimpleFit gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    // Refuses to start without AUTH_SECRET.
    let config = GatewayConfig::from_env()?;
    let addr = config.bind_address()?;

    let (identities, exercises): (Arc<dyn IdentityStore>, Arc<dyn ExerciseStore>) =
        match config.database_path() {
            Some(path) => {
                let store = Arc::new(RedbStore::open(&path)?);
                (store.clone() as Arc<dyn IdentityStore>, store as Arc<dyn ExerciseStore>)
            }
            None => {
                tracing::warn!("DATA_DIR not set, identities and exercises are kept in memory");
                let store = Arc::new(MemoryStore::new());
                (store.clone() as Arc<dyn IdentityStore>, store as Arc<dyn ExerciseStore>)
            }
        };

    tracing::info!(
        allowed_origins = config.allowed_origins.len(),
        store_timeout_ms = config.store_timeout.as_millis() as u64,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config, identities, exercises);
    let app = router(state);

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "SimpleFit gateway listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    tracing::info!("SimpleFit gateway stopped");
    Ok(())
}

/// Cancel `shutdown` on Ctrl-C or SIGTERM.
async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
