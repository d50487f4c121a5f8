//! Helper functions for integration tests

use std::time::Duration;

use statuspage_pusher::{PrometheusClient, PusherMetrics, StatuspageClient};
use url::Url;
use wiremock::MockServer;

pub const PAGE_ID: &str = "page-1";
pub const API_KEY: &str = "test-key";

pub fn prometheus_client(server: &MockServer, metrics: &PusherMetrics) -> PrometheusClient {
    PrometheusClient::new(&Url::parse(&server.uri()).unwrap(), metrics.clone()).unwrap()
}

pub fn prometheus_client_with_timeout(
    server: &MockServer,
    metrics: &PusherMetrics,
    timeout: Duration,
) -> PrometheusClient {
    PrometheusClient::with_timeout(&Url::parse(&server.uri()).unwrap(), metrics.clone(), timeout)
        .unwrap()
}

pub fn statuspage_client(server: &MockServer) -> StatuspageClient {
    statuspage_client_for_page(server, PAGE_ID)
}

pub fn statuspage_client_for_page(server: &MockServer, page_id: &str) -> StatuspageClient {
    StatuspageClient::new(
        Url::parse(&server.uri()).unwrap(),
        page_id.to_string(),
        API_KEY.to_string(),
    )
    .unwrap()
}

/// Instant vector with one series per value
pub fn vector_response(values: &[&str]) -> serde_json::Value {
    let result: Vec<_> = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json::json!({
                "metric": { "__name__": "up", "instance": format!("host-{i}") },
                "value": [1700000000.0, value]
            })
        })
        .collect();

    serde_json::json!({
        "status": "success",
        "data": { "resultType": "vector", "result": result }
    })
}

pub fn status_body(status: &str) -> serde_json::Value {
    serde_json::json!({ "component": { "status": status } })
}
