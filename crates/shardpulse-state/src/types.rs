//! Domain types for the ShardPulse shard store.
//!
//! These types represent the persisted health state of one reporting
//! shard. All types are serializable to/from JSON for storage in the
//! redb table.

use serde::{Deserialize, Serialize};

/// Unique identifier for a reporting shard.
pub type ShardId = String;

/// Current liveness status of a shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShardStatus {
    Up,
    #[default]
    Down,
}

impl ShardStatus {
    /// Wire form, as it appears in heartbeat payloads and events.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShardStatus::Up => "up",
            ShardStatus::Down => "down",
        }
    }
}

/// One latency sample in the trailing 24h window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingSample {
    /// Epoch milliseconds when the sample was recorded.
    pub t: u64,
    /// Round-trip latency in milliseconds.
    pub ping: u64,
}

/// One status transition in the trailing 24h window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Epoch milliseconds when the transition was recorded.
    pub t: u64,
    /// Status the shard transitioned to.
    pub event: ShardStatus,
}

/// Persisted health record for one shard.
///
/// Invariant: `status == Up` iff `ping`, `uptime_since`, and
/// `last_heartbeat_at` are all present; `status == Down` implies all
/// three are absent. `server` and `version` are sticky metadata and
/// survive down transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardRecord {
    pub id: ShardId,
    pub status: ShardStatus,
    /// Latest reported latency in milliseconds; present iff up.
    pub ping: Option<u64>,
    /// Start of the current unbroken up-streak (epoch ms); present iff up.
    pub uptime_since: Option<u64>,
    /// Epoch ms of the most recent up heartbeat; present iff up.
    /// Consumed only by the staleness sweeper.
    pub last_heartbeat_at: Option<u64>,
    /// Sticky reporter metadata, overwritten only when a report carries it.
    pub server: Option<String>,
    pub version: Option<String>,
    /// Trailing-24h latency samples, non-decreasing in `t`.
    pub ping_history: Vec<PingSample>,
    /// Trailing-24h status transitions, non-decreasing in `t`.
    pub event_history: Vec<StatusEvent>,
}

impl ShardRecord {
    /// Whether the shard is currently up.
    pub fn is_up(&self) -> bool {
        self.status == ShardStatus::Up
    }
}
