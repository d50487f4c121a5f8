//! Startup failures of the pusher binary
//!
//! Invalid settings must stop the process with a non-zero exit before the
//! scheduler runs or any outbound request is made.

use std::process::Command;

use wiremock::MockServer;

const BIN: &str = env!("CARGO_BIN_EXE_statuspage-pusher");

fn pusher(prometheus: &MockServer, statuspage: &MockServer) -> Command {
    let mut command = Command::new(BIN);
    command
        .env_clear()
        .env("PROM", prometheus.uri())
        .env("STATUSPAGE_URL", statuspage.uri())
        .env("LISTEN", "127.0.0.1:0")
        .env("INTERVAL", "1s");
    command
}

async fn assert_no_requests(prometheus: &MockServer, statuspage: &MockServer) {
    assert!(prometheus.received_requests().await.unwrap().is_empty());
    assert!(statuspage.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unparsable_interval_exits() {
    let prometheus = MockServer::start().await;
    let statuspage = MockServer::start().await;

    let output = pusher(&prometheus, &statuspage)
        .env("INTERVAL", "abc")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("interval"), "unexpected stderr: {stderr}");
    assert_no_requests(&prometheus, &statuspage).await;
}

#[tokio::test]
async fn test_invalid_log_level_exits() {
    let prometheus = MockServer::start().await;
    let statuspage = MockServer::start().await;

    let output = pusher(&prometheus, &statuspage)
        .env("LOGLEVEL", "chatty")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_no_requests(&prometheus, &statuspage).await;
}

#[tokio::test]
async fn test_missing_config_file_exits() {
    let prometheus = MockServer::start().await;
    let statuspage = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let output = pusher(&prometheus, &statuspage)
        .env("CONFIG", dir.path().join("missing.yaml"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file"), "unexpected stderr: {stderr}");
    assert_no_requests(&prometheus, &statuspage).await;
}

#[tokio::test]
async fn test_malformed_config_file_exits() {
    let prometheus = MockServer::start().await;
    let statuspage = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("queries.yaml");
    std::fs::write(&config, "comp-a: [unterminated").unwrap();

    let output = pusher(&prometheus, &statuspage)
        .env("CONFIG", &config)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_no_requests(&prometheus, &statuspage).await;
}
