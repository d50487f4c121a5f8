//! HTTP endpoints of the pusher process
//!
//! ## Endpoints
//!
//! - `GET /healthz` - Liveness check, always `OK`
//! - `GET /metrics` - Self-observability metrics in Prometheus text format
//!
//! The server runs on its own task and never blocks the scheduler.

pub mod error;
pub mod routes;

pub use error::{ApiError, ApiResult};

use std::net::SocketAddr;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::telemetry::PusherMetrics;

pub fn router(metrics: PusherMetrics) -> Router {
    Router::new()
        .route("/healthz", get(routes::health::healthz))
        .route("/metrics", get(routes::metrics::metrics))
        .with_state(metrics)
        .layer(TraceLayer::new_for_http())
}

/// Spawn the HTTP server
///
/// Binding happens before this returns, so a port conflict surfaces as a
/// startup error. Returns the bound address.
pub async fn spawn_api_server(
    bind_addr: SocketAddr,
    metrics: PusherMetrics,
) -> anyhow::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("HTTP server listening on {addr}");

    let app = router(metrics);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {e}");
        }
    });

    Ok(addr)
}
