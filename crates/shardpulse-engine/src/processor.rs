//! Heartbeat processing — applies one report to one shard record.
//!
//! The transition rules:
//!
//! - first heartbeat for an unseen id creates the record, seeded with
//!   one event (and one ping sample when reporting up);
//! - an up report sets ping, appends a sample and an "up" event, and
//!   starts the uptime streak only if one isn't already running;
//! - anything else is a down report: ping, uptime, and the sweeper
//!   deadline are cleared and a "down" event is appended. Sticky
//!   metadata (`server`, `version`) survives.

use serde::Deserialize;
use tracing::debug;

use shardpulse_state::{
    PingSample, ShardRecord, ShardStatus, ShardStore, StateError, StatusEvent,
};

use crate::error::{EngineError, EngineResult};

/// Inbound heartbeat payload for one shard.
///
/// Every field is optional; a report with no `status` (or any status
/// other than `"up"`) counts as a down report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeartbeatReport {
    pub status: Option<String>,
    /// Round-trip latency in milliseconds.
    pub ping: Option<u64>,
    pub server: Option<String>,
    pub version: Option<String>,
}

impl HeartbeatReport {
    fn reports_up(&self) -> bool {
        self.status.as_deref() == Some("up")
    }
}

/// Apply one heartbeat to one shard, creating the record on first
/// contact. The read-modify-write runs atomically against the store;
/// on storage failure the record is left unchanged.
pub fn apply_heartbeat(
    store: &ShardStore,
    id: &str,
    report: &HeartbeatReport,
    now_ms: u64,
) -> EngineResult<ShardRecord> {
    if id.is_empty() {
        return Err(EngineError::MalformedReport("empty shard id".to_string()));
    }

    let updated = store.update(id, |existing| Some(next_record(existing, id, report, now_ms)))?;

    debug!(%id, up = report.reports_up(), "heartbeat applied");
    updated.ok_or_else(|| {
        EngineError::Storage(StateError::Write("heartbeat produced no record".to_string()))
    })
}

/// Delete a shard record, reporting `UnknownShard` when absent.
pub fn delete_shard(store: &ShardStore, id: &str) -> EngineResult<()> {
    if store.delete(id)? {
        Ok(())
    } else {
        Err(EngineError::UnknownShard(id.to_string()))
    }
}

/// Compute the next record for a shard given an inbound report.
fn next_record(
    existing: Option<ShardRecord>,
    id: &str,
    report: &HeartbeatReport,
    now_ms: u64,
) -> ShardRecord {
    let mut record = existing.unwrap_or_else(|| ShardRecord {
        id: id.to_string(),
        status: ShardStatus::Down,
        ping: None,
        uptime_since: None,
        last_heartbeat_at: None,
        server: None,
        version: None,
        ping_history: Vec::new(),
        event_history: Vec::new(),
    });

    if report.reports_up() {
        mark_up(&mut record, report.ping.unwrap_or(0), now_ms);
    } else {
        mark_down(&mut record, now_ms);
    }

    // Sticky metadata: overwrite only when the report carries it.
    if let Some(server) = &report.server {
        record.server = Some(server.clone());
    }
    if let Some(version) = &report.version {
        record.version = Some(version.clone());
    }

    record
}

/// Up transition: record the ping, extend the histories, and keep the
/// uptime streak running (an up→up heartbeat never resets it).
fn mark_up(record: &mut ShardRecord, ping: u64, now_ms: u64) {
    record.status = ShardStatus::Up;
    record.ping = Some(ping);
    record.ping_history.push(PingSample { t: now_ms, ping });
    record.event_history.push(StatusEvent {
        t: now_ms,
        event: ShardStatus::Up,
    });
    if record.uptime_since.is_none() {
        record.uptime_since = Some(now_ms);
    }
    record.last_heartbeat_at = Some(now_ms);
}

/// Down transition: clear everything the up-record invariant ties to
/// status and append a "down" event. Shared with the staleness sweeper
/// so a timeout demotion is indistinguishable from an explicit down
/// report. No ping sample is appended.
pub(crate) fn mark_down(record: &mut ShardRecord, now_ms: u64) {
    record.status = ShardStatus::Down;
    record.ping = None;
    record.uptime_since = None;
    record.last_heartbeat_at = None;
    record.event_history.push(StatusEvent {
        t: now_ms,
        event: ShardStatus::Down,
    });
}
