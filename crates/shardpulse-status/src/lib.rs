//! shardpulse-status — pure status derivation for ShardPulse.
//!
//! Turns persisted shard records into presentation values: the
//! fixed-resolution status timeline and one-line textual summaries.
//! Nothing here touches the store or the clock; callers pass `now`.

pub mod summary;
pub mod timeline;

pub use summary::{average_ping, fleet_status_lines, format_uptime, status_line};
pub use timeline::{render_timeline, TimelineSegment, DEFAULT_SEGMENT_COUNT};
