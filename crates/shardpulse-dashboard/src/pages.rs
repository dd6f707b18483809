//! Status page handler.
//!
//! Queries the shard store, builds view types, and renders the Askama
//! template.

use askama::Template;
use axum::extract::State;
use axum::response::Html;

use shardpulse_engine::epoch_ms;

use crate::views::{sort_records, ShardView};
use crate::DashboardState;

/// Lookback period of the timeline strip: the 24h history window.
const TIMELINE_PERIOD_SECS: u64 = 24 * 60 * 60;

fn render<T: Template>(tmpl: T) -> Html<String> {
    Html(tmpl.render().unwrap_or_else(|e| {
        tracing::error!(error = %e, "template render failed");
        format!("<pre>Template error: {e}</pre>")
    }))
}

#[derive(Template)]
#[template(path = "status.html")]
struct StatusTemplate {
    shards: Vec<ShardView>,
}

pub async fn status_page(State(state): State<DashboardState>) -> Html<String> {
    let now_ms = epoch_ms();
    let mut records = state.store.list_all().unwrap_or_default();
    sort_records(&mut records);

    let shards = records
        .iter()
        .map(|record| ShardView::from_record(record, TIMELINE_PERIOD_SECS, now_ms))
        .collect();

    render(StatusTemplate { shards })
}
