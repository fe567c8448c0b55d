//! HLS façade over the obfuscated site.
//!
//! Players pull `/movies/{id}/{hash}/index.m3u8` and then the rewritten
//! `/<prefix>/{token}.ts` segment paths; the server resolves manifests and
//! strips segment disguises on their behalf.

mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use error::ApiError;

use crate::error::Result;
use crate::proxy::ManifestProxy;

/// Builds the proxy router.
pub fn router(proxy: ManifestProxy) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let segment_route = format!("/{}/{{file}}", proxy.prefix());

    Router::new()
        .route("/health", get(handlers::health))
        .route("/search", post(handlers::search))
        .route("/movies/{id}/index.m3u8", get(handlers::movie_index))
        .route(
            "/movies/{id}/{hash}/index.m3u8",
            get(handlers::episode_playlist),
        )
        .route(&segment_route, get(handlers::segment))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(proxy))
}

/// Serves until Ctrl-C.
pub async fn serve(proxy: ManifestProxy, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "proxy listening");

    axum::serve(listener, router(proxy))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
