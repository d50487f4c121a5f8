//! Integration tests for the /healthz and /metrics endpoints

use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use statuspage_pusher::PusherMetrics;
use statuspage_pusher::api::{router, spawn_api_server};
use tower::ServiceExt;

async fn get(metrics: &PusherMetrics, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = router(metrics.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_healthz() {
    let metrics = PusherMetrics::new().unwrap();

    let (status, _, body) = get(&metrics, "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_metrics_exposes_histograms() {
    let metrics = PusherMetrics::new().unwrap();
    metrics.observe_prometheus_request(Duration::from_millis(40));
    metrics.observe_cycle(Duration::from_millis(90));

    let (status, content_type, body) = get(&metrics, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain; version=0.0.4"));
    assert!(body.contains("# HELP statuspage_pusher_prometheus_requests The response times of prometheus requests"));
    assert!(body.contains("# TYPE statuspage_pusher_prometheus_requests histogram"));
    assert!(body.contains("statuspage_pusher_prometheus_requests_count 1"));
    assert!(body.contains("statuspage_pusher_cycle_duration_seconds_count 1"));

    #[cfg(target_os = "linux")]
    {
        assert!(body.contains("# TYPE process_cpu_seconds_total counter"));
        assert!(body.contains("process_open_fds"));
    }
}

#[tokio::test]
async fn test_unknown_route() {
    let metrics = PusherMetrics::new().unwrap();

    let (status, _, _) = get(&metrics, "/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_spawned_server_answers() {
    let metrics = PusherMetrics::new().unwrap();
    let addr = spawn_api_server("127.0.0.1:0".parse().unwrap(), metrics)
        .await
        .unwrap();

    let response = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");

    let response = reqwest::get(format!("http://{addr}/metrics")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("statuspage_pusher_prometheus_requests")
    );
}

#[tokio::test]
async fn test_bind_conflict_is_an_error() {
    let metrics = PusherMetrics::new().unwrap();
    let addr = spawn_api_server("127.0.0.1:0".parse().unwrap(), metrics.clone())
        .await
        .unwrap();

    assert!(spawn_api_server(addr, metrics).await.is_err());
}
