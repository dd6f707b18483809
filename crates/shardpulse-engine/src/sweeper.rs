//! Staleness sweeper — demotes shards that stopped heartbeating.
//!
//! A shard whose last up heartbeat is older than the configured
//! timeout is forced down exactly as if a down report had arrived.
//! The sweep runs as a single batched store transaction, and the poll
//! interval is deliberately decoupled from the timeout: polling at a
//! shorter interval keeps a shard that heartbeats at exactly the
//! timeout cadence from flapping on scheduling jitter.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use shardpulse_state::ShardStore;

use crate::epoch_ms;
use crate::error::EngineResult;
use crate::processor::mark_down;

/// Periodic job that forces silent shards down.
pub struct Sweeper {
    store: ShardStore,
    /// Staleness threshold. A domain concept, not a task timeout.
    timeout: Duration,
}

impl Sweeper {
    /// Create a sweeper with the given staleness threshold.
    pub fn new(store: ShardStore, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// One sweep pass. Returns the number of shards demoted.
    ///
    /// Records already down (no `last_heartbeat_at`) and records still
    /// within the timeout are untouched.
    pub fn sweep_once(&self, now_ms: u64) -> EngineResult<u32> {
        let timeout_ms = self.timeout.as_millis() as u64;
        let swept = self.store.update_all(|mut record| {
            match record.last_heartbeat_at {
                Some(last) if now_ms.saturating_sub(last) > timeout_ms => {
                    mark_down(&mut record, now_ms);
                    Some(record)
                }
                _ => None,
            }
        })?;
        if swept > 0 {
            info!(swept, timeout_secs = self.timeout.as_secs(), "stale shards demoted");
        }
        Ok(swept)
    }

    /// Run the sweep loop until the shutdown signal flips.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = interval.as_secs(),
            timeout_secs = self.timeout.as_secs(),
            "staleness sweeper started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    if let Err(e) = self.sweep_once(epoch_ms()) {
                        error!(error = %e, "staleness sweep failed");
                    }
                }
                _ = shutdown.changed() => {
                    info!("staleness sweeper shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::{apply_heartbeat, HeartbeatReport};
    use shardpulse_state::ShardStatus;

    fn up_report(ping: u64) -> HeartbeatReport {
        HeartbeatReport {
            status: Some("up".to_string()),
            ping: Some(ping),
            ..Default::default()
        }
    }

    #[test]
    fn sweep_demotes_shard_past_timeout() {
        let store = ShardStore::open_in_memory().unwrap();
        let t = 1_000_000;
        apply_heartbeat(&store, "a", &up_report(42), t).unwrap();

        let sweeper = Sweeper::new(store.clone(), Duration::from_secs(60));
        // 61 seconds later the shard is stale.
        let swept = sweeper.sweep_once(t + 61_000).unwrap();
        assert_eq!(swept, 1);

        let record = store.get("a").unwrap().unwrap();
        assert_eq!(record.status, ShardStatus::Down);
        assert!(record.ping.is_none());
        assert!(record.uptime_since.is_none());
        assert!(record.last_heartbeat_at.is_none());
        // Exactly one new "down" event appended.
        assert_eq!(record.event_history.len(), 2);
        assert_eq!(record.event_history[1].event, ShardStatus::Down);
        assert_eq!(record.event_history[1].t, t + 61_000);
    }

    #[test]
    fn sweep_skips_shard_within_timeout() {
        let store = ShardStore::open_in_memory().unwrap();
        let t = 1_000_000;
        apply_heartbeat(&store, "a", &up_report(42), t).unwrap();

        let sweeper = Sweeper::new(store.clone(), Duration::from_secs(60));
        // Exactly at the boundary: not strictly greater, not stale.
        assert_eq!(sweeper.sweep_once(t + 60_000).unwrap(), 0);

        let record = store.get("a").unwrap().unwrap();
        assert_eq!(record.status, ShardStatus::Up);
        assert_eq!(record.event_history.len(), 1);
    }

    #[test]
    fn sweep_ignores_already_down_shards() {
        let store = ShardStore::open_in_memory().unwrap();
        apply_heartbeat(&store, "a", &HeartbeatReport::default(), 1000).unwrap();

        let sweeper = Sweeper::new(store.clone(), Duration::from_secs(60));
        assert_eq!(sweeper.sweep_once(10_000_000).unwrap(), 0);

        // No extra down event piled on.
        let record = store.get("a").unwrap().unwrap();
        assert_eq!(record.event_history.len(), 1);
    }

    #[test]
    fn sweep_handles_mixed_fleet() {
        let store = ShardStore::open_in_memory().unwrap();
        let t = 1_000_000;
        apply_heartbeat(&store, "stale", &up_report(42), t).unwrap();
        apply_heartbeat(&store, "fresh", &up_report(10), t + 55_000).unwrap();
        apply_heartbeat(&store, "down", &HeartbeatReport::default(), t).unwrap();

        let sweeper = Sweeper::new(store.clone(), Duration::from_secs(60));
        let swept = sweeper.sweep_once(t + 61_000).unwrap();
        assert_eq!(swept, 1);

        assert_eq!(store.get("stale").unwrap().unwrap().status, ShardStatus::Down);
        assert_eq!(store.get("fresh").unwrap().unwrap().status, ShardStatus::Up);
    }

    #[test]
    fn sweep_on_empty_store() {
        let store = ShardStore::open_in_memory().unwrap();
        let sweeper = Sweeper::new(store, Duration::from_secs(60));
        assert_eq!(sweeper.sweep_once(1000).unwrap(), 0);
    }
}
