//! REST API handlers.
//!
//! Each handler reads/writes via `ShardStore` and returns JSON (or
//! markdown for `/status`). Engine errors map onto status codes:
//! malformed reports → 400, unknown shards → 404, storage faults → 500.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::error;

use shardpulse_engine::{apply_heartbeat, epoch_ms, EngineError, HeartbeatReport};
use shardpulse_status::fleet_status_lines;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

fn engine_error_response(e: &EngineError) -> axum::response::Response {
    let status = match e {
        EngineError::MalformedReport(_) => StatusCode::BAD_REQUEST,
        EngineError::UnknownShard(_) => StatusCode::NOT_FOUND,
        EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %e, "storage fault while handling request");
    }
    error_response(&e.to_string(), status).into_response()
}

// ── Heartbeats ─────────────────────────────────────────────────

/// POST /shard/{id}
///
/// A present `status` field of any value is normalized to "up" before
/// processing; reporters signal down by omitting it.
pub async fn post_heartbeat(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(mut report): Json<HeartbeatReport>,
) -> impl IntoResponse {
    if report.status.is_some() {
        report.status = Some("up".to_string());
    }

    match apply_heartbeat(&state.store, &id, &report, epoch_ms()) {
        Ok(record) => ApiResponse::ok(record).into_response(),
        Err(e) => engine_error_response(&e),
    }
}

// ── Reads ──────────────────────────────────────────────────────

/// GET /shard/{id}
pub async fn get_shard(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get(&id) {
        Ok(Some(record)) => ApiResponse::ok(record).into_response(),
        Ok(None) => error_response("shard not found", StatusCode::NOT_FOUND).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// GET /shards
pub async fn list_shards(State(state): State<ApiState>) -> impl IntoResponse {
    match state.store.list_all() {
        Ok(records) => ApiResponse::ok(records).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// GET /status — markdown, one summary line per shard.
pub async fn fleet_status(State(state): State<ApiState>) -> impl IntoResponse {
    match state.store.list_all() {
        Ok(records) => {
            let body = fleet_status_lines(&records, epoch_ms()).join("\n");
            (
                StatusCode::OK,
                [("content-type", "text/markdown; charset=UTF-8")],
                body,
            )
                .into_response()
        }
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// GET /ping — liveness echo; never cached.
pub async fn ping() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            ("cache-control", "no-store, no-cache, must-revalidate"),
            ("content-type", "application/json"),
        ],
        serde_json::json!({ "timestamp": epoch_ms() }).to_string(),
    )
}

// ── Deletions ──────────────────────────────────────────────────

/// DELETE /shard/{id}
pub async fn delete_shard(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match shardpulse_engine::delete_shard(&state.store, &id) {
        Ok(()) => ApiResponse::ok("deleted").into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// DELETE /reset
pub async fn reset(State(state): State<ApiState>) -> impl IntoResponse {
    match state.store.clear_all() {
        Ok(removed) => ApiResponse::ok(serde_json::json!({ "removed": removed })).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardpulse_state::{ShardStatus, ShardStore};

    fn test_state() -> ApiState {
        ApiState {
            store: ShardStore::open_in_memory().unwrap(),
        }
    }

    fn up_report(ping: u64) -> HeartbeatReport {
        HeartbeatReport {
            status: Some("up".to_string()),
            ping: Some(ping),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn heartbeat_creates_record() {
        let state = test_state();

        let resp = post_heartbeat(
            State(state.clone()),
            Path("0".to_string()),
            Json(up_report(42)),
        )
        .await
        .into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let record = state.store.get("0").unwrap().unwrap();
        assert_eq!(record.status, ShardStatus::Up);
        assert_eq!(record.ping, Some(42));
    }

    #[tokio::test]
    async fn heartbeat_status_normalized_to_up() {
        let state = test_state();
        let report = HeartbeatReport {
            status: Some("alive".to_string()),
            ping: Some(10),
            ..Default::default()
        };

        post_heartbeat(State(state.clone()), Path("0".to_string()), Json(report))
            .await
            .into_response();

        // Any present status counts as up at the router boundary.
        assert_eq!(state.store.get("0").unwrap().unwrap().status, ShardStatus::Up);
    }

    #[tokio::test]
    async fn heartbeat_without_status_is_down() {
        let state = test_state();

        post_heartbeat(
            State(state.clone()),
            Path("0".to_string()),
            Json(HeartbeatReport::default()),
        )
        .await
        .into_response();

        assert_eq!(state.store.get("0").unwrap().unwrap().status, ShardStatus::Down);
    }

    #[tokio::test]
    async fn get_shard_found_and_not_found() {
        let state = test_state();
        post_heartbeat(
            State(state.clone()),
            Path("0".to_string()),
            Json(up_report(42)),
        )
        .await
        .into_response();

        let resp = get_shard(State(state.clone()), Path("0".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = get_shard(State(state), Path("nope".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_shards_empty_is_ok() {
        let state = test_state();
        let resp = list_shards(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn status_returns_markdown() {
        let state = test_state();
        let resp = fleet_status(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.contains("text/markdown"));
    }

    #[tokio::test]
    async fn delete_shard_found_and_not_found() {
        let state = test_state();
        post_heartbeat(
            State(state.clone()),
            Path("0".to_string()),
            Json(up_report(42)),
        )
        .await
        .into_response();

        let resp = delete_shard(State(state.clone()), Path("0".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = delete_shard(State(state), Path("0".to_string()))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reset_clears_store() {
        let state = test_state();
        post_heartbeat(
            State(state.clone()),
            Path("0".to_string()),
            Json(up_report(42)),
        )
        .await
        .into_response();

        let resp = reset(State(state.clone())).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(state.store.list_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ping_sets_no_store_headers() {
        let resp = ping().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let cache = resp.headers().get("cache-control").unwrap().to_str().unwrap();
        assert!(cache.contains("no-store"));
    }
}
