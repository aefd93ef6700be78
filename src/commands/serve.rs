//! `serve`: run the HTTP API and the background worker.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tokio::sync::watch;

use herp_api::{AppState, build_router};
use herp_auth::build_mailer;
use herp_core::config::AppConfig;
use herp_core::error::{AppError, ErrorKind};
use herp_database::migration::run_migrations;
use herp_worker::{TokenSweepJob, WorkerRunner};

use super::Runtime;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Skip applying migrations on startup
    #[arg(long)]
    pub skip_migrations: bool,
}

pub async fn execute(args: &ServeArgs, config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Herp server");

    let runtime = Runtime::connect(&config).await?;
    if !args.skip_migrations {
        run_migrations(runtime.database.pool()).await?;
    }

    let state = AppState::new(
        config.clone(),
        runtime.stores.clone(),
        Arc::clone(&runtime.cache),
        build_mailer(&config.mail)?,
        Arc::clone(&runtime.clock),
        Some(runtime.database.clone()),
    )?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker_handle = if config.worker.enabled {
        let sweep = TokenSweepJob::new(
            state.auth.sessions().clone(),
            Duration::from_secs(config.worker.token_sweep_interval_seconds),
        );
        let runner = WorkerRunner::new().with_job(Arc::new(sweep));
        Some(tokio::spawn(async move { runner.run(shutdown_rx).await }))
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    let app = build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e))?;

    tracing::info!(addr = %addr, "Herp server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown");
        let _ = shutdown_tx.send(true);
    })
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;

    if let Some(handle) = worker_handle {
        let _ = tokio::time::timeout(Duration::from_secs(30), handle).await;
    }
    runtime.database.close().await;

    tracing::info!("Herp server shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM. If a handler cannot be installed, that
/// source is ignored and the other still triggers shutdown.
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
