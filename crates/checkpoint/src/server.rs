// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status and verification HTTP server built on axum.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
};
use checkpoint_cache::CacheAsideStore;
use checkpoint_core::CheckpointError;
use checkpoint_watch::LegislationWatcher;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::app::Gateways;
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateways: Arc<Gateways>,
    pub cache: Arc<CacheAsideStore>,
    /// Present when the legislation watcher runs in this process.
    pub watcher: Option<Arc<LegislationWatcher>>,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
    /// Optional Prometheus metrics render function.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
    /// Cancelled on shutdown; each verification runs under a child token.
    pub shutdown: CancellationToken,
}

/// Assemble the router:
/// - GET /health (add `?reprobe=true` to retry a degraded cache)
/// - GET /metrics
/// - POST /v1/verify/{domain}
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/metrics", get(handlers::get_metrics))
        .route("/v1/verify/{domain}", post(handlers::post_verify))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `host:port` and serve until `state.shutdown` is cancelled.
pub async fn start_server(host: &str, port: u16, state: AppState) -> Result<(), CheckpointError> {
    let shutdown = state.shutdown.clone();
    let app = router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CheckpointError::Transport {
            message: format!("failed to bind server to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| CheckpointError::Transport {
            message: format!("server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("server stopped");
    Ok(())
}
