//! Server lifecycle management - startup, shutdown, and signal handling

use crate::config::ServerConfig;
use crate::errors::{HttpError, HttpResult};
use crate::routes::router;
use crate::state::AppState;
use axum::Router;
use roomcast_core::RoomHub;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Bind `config.bind_addr` and serve until Ctrl+C or SIGTERM
pub async fn start_server(config: ServerConfig, hub: Arc<RoomHub>) -> HttpResult<()> {
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| HttpError::startup(format!("Failed to bind to {}: {}", config.bind_addr, e)))?;

    let state = AppState::new(hub, config.admin_token.clone());
    let app = router(state, &config);

    info!(
        bind_addr = %config.bind_addr,
        public_dir = %config.public_dir.display(),
        admin_token_set = config.admin_token.is_some(),
        "server listening"
    );

    serve(listener, app, shutdown_signal(), config.shutdown_timeout()).await
}

/// Serve `app` on an already bound listener
///
/// Once `shutdown` resolves, open connections get `grace` to finish before
/// the server stops waiting for them.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F, grace: Duration) -> HttpResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (stopping_tx, mut stopping_rx) = watch::channel(false);

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown.await;
        let _ = stopping_tx.send(true);
    })
    .into_future();

    let deadline = async move {
        if stopping_rx.changed().await.is_err() {
            // Sender gone without signalling: the server finished on its own
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => {
            result.map_err(|e| HttpError::internal(format!("Server error: {}", e)))?;
            info!("server stopped");
        }
        _ = deadline => {
            warn!(grace_secs = grace.as_secs(), "connections still open after shutdown grace period, stopping anyway");
        }
    }

    Ok(())
}

/// Graceful shutdown signal handler
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            warn!("received terminate signal, shutting down gracefully");
        },
    }
}
