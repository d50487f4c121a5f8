//! Prometheus exposition of the pusher's own metrics

use axum::{extract::State, http::header, response::IntoResponse};

use crate::api::error::ApiResult;
use crate::telemetry::PusherMetrics;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// GET /metrics
pub async fn metrics(State(metrics): State<PusherMetrics>) -> ApiResult<impl IntoResponse> {
    let body = metrics.export()?;
    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE)], body))
}
