//! Human-readable status summaries.
//!
//! Pure derivations from a shard record: 24h average ping, uptime
//! formatting, and the one-line markdown summary the `/status`
//! endpoint serves.

use shardpulse_state::{PingSample, ShardRecord, ShardStatus};

const EMOJI_UP: &str = "🟢";
const EMOJI_DOWN: &str = "❌";

/// Integer mean of the sampled pings, truncated toward zero. Zero for
/// an empty window.
pub fn average_ping(samples: &[PingSample]) -> u64 {
    if samples.is_empty() {
        return 0;
    }
    let sum: u64 = samples.iter().map(|s| s.ping).sum();
    sum / samples.len() as u64
}

/// Decompose a duration in seconds into `{d}d {hh}h {mm}m {ss}s`.
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;
    format!("{days}d {hours:02}h {minutes:02}m {secs:02}s")
}

/// One-line markdown summary for a shard.
///
/// `solo` flips the display name from `Shard {id}` to `Fleet Status`
/// when the fleet has a single reporter.
pub fn status_line(record: &ShardRecord, now_ms: u64, solo: bool) -> String {
    let name = if solo {
        "Fleet Status".to_string()
    } else {
        format!("Shard {}", record.id)
    };
    let version = record
        .version
        .as_ref()
        .map(|v| format!("`v{v}` - "))
        .unwrap_or_default();

    match record.status {
        ShardStatus::Up => {
            let uptime = record
                .uptime_since
                .map(|since| format_uptime(now_ms.saturating_sub(since) / 1000))
                .unwrap_or_else(|| "none".to_string());
            let ping = record.ping.unwrap_or(0);
            let avg = average_ping(&record.ping_history);
            format!(
                "{version}{name} &nbsp; **status:** {EMOJI_UP} **up:** `{uptime}` \
                 **ping:** `{ping}ms` **24h average ping:** `{avg}ms`"
            )
        }
        ShardStatus::Down => {
            format!("{version}{name} &nbsp; **status:** {EMOJI_DOWN}")
        }
    }
}

/// Status lines for the whole fleet, sorted by shard id (numeric when
/// the ids parse, lexicographic otherwise). An empty fleet yields a
/// single hint line for reporters.
pub fn fleet_status_lines(records: &[ShardRecord], now_ms: u64) -> Vec<String> {
    if records.is_empty() {
        return vec![
            "No shards listed... Start sending data to the api via the /shard endpoint!"
                .to_string(),
        ];
    }
    if records.len() == 1 {
        return vec![status_line(&records[0], now_ms, true)];
    }

    let mut sorted: Vec<&ShardRecord> = records.iter().collect();
    sorted.sort_by(|a, b| match (a.id.parse::<u64>(), b.id.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.id.cmp(&b.id),
    });

    sorted
        .iter()
        .map(|record| status_line(record, now_ms, false))
        .collect()
}
