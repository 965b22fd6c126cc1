//! HTTP API tests

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use community_scan::api::{router, AppState};
use community_scan::community::{ForkNetworkAggregator, RepoIdentity, ScanSettings};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::MockServer;

mod common;
use common::*;

async fn get_json(server: &MockServer, uri: &str) -> (StatusCode, Value) {
    let state = Arc::new(AppState {
        aggregator: ForkNetworkAggregator::new(create_test_client(server), ScanSettings::default()),
        identity: RepoIdentity::new("forkZoo", "forkMonkey"),
    });

    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    let (status, body) = get_json(&server, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "community-scan");
}

#[tokio::test]
async fn test_community_endpoint_returns_live_scan() {
    let server = MockServer::start().await;
    mount_repo(&server, "forkZoo", "forkMonkey", repo_json("forkZoo", "forkMonkey")).await;
    mount_forks(
        &server,
        "forkZoo",
        "forkMonkey",
        vec![fork_json("alice", "forkMonkey", repo_json("forkZoo", "forkMonkey"))],
    )
    .await;
    mount_file(&server, "forkZoo", "forkMonkey", STATS_PATH, &stats_body(2, 20.0)).await;
    mount_file(&server, "alice", "forkMonkey", IMAGE_PATH, "<svg/>").await;

    let (status, body) = get_json(&server, "/api/community").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "live");
    assert_eq!(body["source_repo"], "forkZoo/forkMonkey");
    assert_eq!(body["count"], 2);
    assert_eq!(body["forks"][0]["is_root"], true);
    assert_eq!(body["forks"][1]["owner"], "alice");
    assert_eq!(body["forks"][1]["monkey_stats"], Value::Null);
}

#[tokio::test]
async fn test_community_endpoint_reports_failure() {
    let server = MockServer::start().await;
    mount_repo(&server, "forkZoo", "forkMonkey", repo_json("forkZoo", "forkMonkey")).await;
    mount_status(&server, "/repos/forkZoo/forkMonkey/forks", 403, rate_limited()).await;

    let (status, body) = get_json(&server, "/api/community").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("forkZoo/forkMonkey"));
}
