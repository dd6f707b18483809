//! shardpulse-api — REST API for ShardPulse.
//!
//! Provides axum route handlers for heartbeat ingestion and fleet
//! status reads. Mounts the dashboard under `/dashboard/`.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/shard/{id}` | Apply a heartbeat report |
//! | GET | `/shard/{id}` | Get one shard record |
//! | DELETE | `/shard/{id}` | Delete one shard record |
//! | GET | `/shards` | List all shard records |
//! | GET | `/status` | Markdown fleet summary |
//! | DELETE | `/reset` | Clear the whole store |
//! | GET | `/ping` | Liveness echo with server timestamp |

pub mod handlers;

use axum::routing::{delete, get};
use axum::Router;
use shardpulse_state::ShardStore;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: ShardStore,
}

/// Build the complete router (REST + dashboard).
pub fn build_router(store: ShardStore) -> Router {
    let api_state = ApiState {
        store: store.clone(),
    };

    let dashboard_state = shardpulse_dashboard::DashboardState { store };

    Router::new()
        .route(
            "/shard/{id}",
            get(handlers::get_shard)
                .post(handlers::post_heartbeat)
                .delete(handlers::delete_shard),
        )
        .route("/shards", get(handlers::list_shards))
        .route("/status", get(handlers::fleet_status))
        .route("/reset", delete(handlers::reset))
        .route("/ping", get(handlers::ping))
        .with_state(api_state)
        // axum 0.8's `nest` does not match the bare trailing-slash path,
        // so route `/dashboard/` explicitly alongside the nested router.
        .route(
            "/dashboard/",
            get(shardpulse_dashboard::pages::status_page).with_state(dashboard_state.clone()),
        )
        .nest("/dashboard", shardpulse_dashboard::dashboard_router(dashboard_state))
}
