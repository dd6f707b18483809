//! Timeline bucketing — reconstructs a status strip from sparse events.
//!
//! The event history only records transitions; rendering replays it as
//! a step function over a fixed number of equal-duration buckets.
//! Bucket index is always `floor((t − window_start) / segment_duration)`,
//! clamped to the strip; each event paints its status forward from its
//! bucket until a later event supersedes it.

use serde::Serialize;

use shardpulse_state::{ShardStatus, StatusEvent};

/// Number of segments the status page renders per shard.
pub const DEFAULT_SEGMENT_COUNT: usize = 70;

/// One bucket of the rendered timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineSegment {
    pub status: ShardStatus,
    /// Wall-clock start of this bucket (epoch ms), for tooltips.
    pub start_ms: u64,
}

/// Render `events` over the window `[now − period, now]` as
/// `segment_count` equal buckets.
///
/// Buckets default to down. Events before the window start are
/// skipped; `events` is expected in chronological order, which the
/// engine guarantees by construction.
pub fn render_timeline(
    events: &[StatusEvent],
    period_secs: u64,
    segment_count: usize,
    now_ms: u64,
) -> Vec<TimelineSegment> {
    if segment_count == 0 {
        return Vec::new();
    }

    let period_ms = period_secs * 1000;
    let window_start = now_ms.saturating_sub(period_ms);
    let segment_duration = period_ms as f64 / segment_count as f64;

    let mut segments: Vec<TimelineSegment> = (0..segment_count)
        .map(|index| TimelineSegment {
            status: ShardStatus::Down,
            start_ms: window_start + (index as f64 * segment_duration) as u64,
        })
        .collect();

    for event in events {
        if event.t < window_start {
            continue;
        }
        let elapsed = (event.t - window_start) as f64;
        let index = ((elapsed / segment_duration) as usize).min(segment_count - 1);
        // Status persists forward until the next event repaints it.
        for segment in &mut segments[index..] {
            segment.status = event.event;
        }
    }

    segments
}
