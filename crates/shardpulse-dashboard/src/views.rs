//! View types for status page rendering.
//!
//! Purpose-built for the Askama template: pre-formatted strings and
//! computed fields so the template stays simple.

use chrono::DateTime;

use shardpulse_state::{ShardRecord, ShardStatus};
use shardpulse_status::{average_ping, format_uptime, render_timeline, DEFAULT_SEGMENT_COUNT};

/// One bar of the event timeline strip.
pub struct EventBar {
    pub status_class: &'static str,
    /// Horizontal position, percent of the strip width.
    pub left_percent: String,
    /// ISO-8601 start of the segment, shown on hover.
    pub tooltip: String,
}

/// One shard card on the status page.
pub struct ShardView {
    pub name: String,
    /// `v1.4.2` when the shard reported a version, empty otherwise.
    pub version_display: String,
    pub status_class: &'static str,
    pub status_emoji: &'static str,
    pub is_up: bool,
    pub uptime_display: String,
    pub ping_display: String,
    pub avg_ping_display: String,
    pub bars: Vec<EventBar>,
}

impl ShardView {
    /// Build a view from a record, rendering its timeline over the
    /// given lookback period.
    pub fn from_record(record: &ShardRecord, period_secs: u64, now_ms: u64) -> Self {
        let segments = render_timeline(
            &record.event_history,
            period_secs,
            DEFAULT_SEGMENT_COUNT,
            now_ms,
        );

        let bars = segments
            .iter()
            .enumerate()
            .map(|(index, segment)| EventBar {
                status_class: class_for(segment.status),
                // Offset so the first bar doesn't sit at 0%.
                left_percent: format!(
                    "{:.2}",
                    ((index + 1) as f64 / (segments.len() + 1) as f64) * 100.0
                ),
                tooltip: iso_timestamp(segment.start_ms),
            })
            .collect();

        let uptime_display = record
            .uptime_since
            .map(|since| format_uptime(now_ms.saturating_sub(since) / 1000))
            .unwrap_or_else(|| "none".to_string());

        Self {
            name: format!("Shard {}", record.id),
            version_display: record
                .version
                .as_ref()
                .map(|v| format!("v{v}"))
                .unwrap_or_default(),
            status_class: class_for(record.status),
            status_emoji: match record.status {
                ShardStatus::Up => "🟢",
                ShardStatus::Down => "❌",
            },
            is_up: record.is_up(),
            uptime_display,
            ping_display: format!("{}ms", record.ping.unwrap_or(0)),
            avg_ping_display: format!("{}ms", average_ping(&record.ping_history)),
            bars,
        }
    }
}

fn class_for(status: ShardStatus) -> &'static str {
    match status {
        ShardStatus::Up => "up",
        ShardStatus::Down => "down",
    }
}

fn iso_timestamp(epoch_ms: u64) -> String {
    DateTime::from_timestamp_millis(epoch_ms as i64)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

/// Sort records by shard id, numerically when the ids parse.
pub fn sort_records(records: &mut [ShardRecord]) {
    records.sort_by(|a, b| match (a.id.parse::<u64>(), b.id.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.id.cmp(&b.id),
    });
}
