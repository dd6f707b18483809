//! End-to-end regression tests over the assembled router.
//!
//! Drives the HTTP surface the way a reporter fleet would: heartbeats
//! in, sweeps between, status reads out.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use shardpulse_api::build_router;
use shardpulse_engine::{epoch_ms, Sweeper};
use shardpulse_state::{ShardStatus, ShardStore};

fn test_store() -> ShardStore {
    ShardStore::open_in_memory().unwrap()
}

fn heartbeat(id: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/shard/{id}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn heartbeat_roundtrip() {
    let store = test_store();
    let router = build_router(store.clone());

    let body = serde_json::json!({ "status": "up", "ping": 42, "version": "1.4.2" });
    let resp = router.clone().oneshot(heartbeat("0", &body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().uri("/shard/0").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let record = store.get("0").unwrap().unwrap();
    assert_eq!(record.status, ShardStatus::Up);
    assert_eq!(record.ping, Some(42));
    assert_eq!(record.version.as_deref(), Some("1.4.2"));
}

#[tokio::test]
async fn get_unknown_shard_is_not_found() {
    let router = build_router(test_store());

    let req = Request::builder().uri("/shard/9").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_heartbeat_body_leaves_store_unchanged() {
    let store = test_store();
    let router = build_router(store.clone());

    let req = Request::builder()
        .method("POST")
        .uri("/shard/0")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .unwrap();

    let resp = router.oneshot(req).await.unwrap();
    assert!(resp.status().is_client_error());
    assert!(store.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn sweep_between_heartbeats_forces_shard_down() {
    let store = test_store();
    let router = build_router(store.clone());

    let body = serde_json::json!({ "status": "up", "ping": 10 });
    router.clone().oneshot(heartbeat("0", &body)).await.unwrap();

    // Simulate the timer firing long after the last heartbeat.
    let sweeper = Sweeper::new(store.clone(), Duration::from_secs(60));
    let swept = sweeper.sweep_once(epoch_ms() + 61_000).unwrap();
    assert_eq!(swept, 1);

    let record = store.get("0").unwrap().unwrap();
    assert_eq!(record.status, ShardStatus::Down);
    assert!(record.ping.is_none());
}

#[tokio::test]
async fn status_page_and_markdown_status() {
    let store = test_store();
    let router = build_router(store);

    let body = serde_json::json!({ "status": "up", "ping": 42 });
    router.clone().oneshot(heartbeat("0", &body)).await.unwrap();

    let req = Request::builder().uri("/status").body(Body::empty()).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().uri("/dashboard/").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn delete_and_reset() {
    let store = test_store();
    let router = build_router(store.clone());

    let body = serde_json::json!({ "status": "up", "ping": 1 });
    router.clone().oneshot(heartbeat("0", &body)).await.unwrap();
    router.clone().oneshot(heartbeat("1", &body)).await.unwrap();

    let req = Request::builder()
        .method("DELETE")
        .uri("/shard/0")
        .body(Body::empty())
        .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(store.list_all().unwrap().len(), 1);

    let req = Request::builder()
        .method("DELETE")
        .uri("/reset")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(store.list_all().unwrap().is_empty());
}
