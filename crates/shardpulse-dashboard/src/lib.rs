//! shardpulse-dashboard — server-rendered status page for ShardPulse.
//!
//! Provides the axum route handler that renders the fleet status page:
//! one card per shard with its current status, uptime, latency, and
//! the 70-segment 24h timeline strip.

pub mod pages;
pub mod views;

use axum::routing::get;
use axum::Router;
use shardpulse_state::ShardStore;

/// Shared state for dashboard handlers.
#[derive(Clone)]
pub struct DashboardState {
    pub store: ShardStore,
}

/// Build the dashboard router.
pub fn dashboard_router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(pages::status_page))
        .with_state(state)
}
