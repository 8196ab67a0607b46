use std::net::SocketAddr;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::decompression::RequestDecompressionLayer;
use tracing::{info, warn};

use super::{
    services::{download_ads, health},
    state::AppState,
};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    let max_concurrent = state.config.server.max_concurrent_requests;

    Router::new()
        .route("/download", post(download_ads))
        .route("/health", get(health))
        .with_state(state)
        // gzip request bodies are decompressed before the handler reads them
        .layer(RequestDecompressionLayer::new())
        .layer(ConcurrencyLimitLayer::new(max_concurrent))
}

/// Serve the API until Ctrl+C or SIGTERM
pub async fn run(address: SocketAddr, state: AppState) -> Result<(), AnyError> {
    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "adfetch API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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
    info!("Shutdown signal received");
}
