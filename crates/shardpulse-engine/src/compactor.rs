//! Window compactor — trims histories to the trailing 24 hours.
//!
//! Heartbeats append to the histories without bound; this hourly pass
//! keeps them at steady state. A record is written back only when the
//! filtered arrays actually shrank, so repeated runs with no new data
//! are no-ops.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use shardpulse_state::ShardStore;

use crate::epoch_ms;
use crate::error::EngineResult;

/// The rolling history window: 24 hours in milliseconds.
pub const WINDOW_MS: u64 = 24 * 60 * 60 * 1000;

/// Periodic job that prunes ping and event histories.
pub struct Compactor {
    store: ShardStore,
}

impl Compactor {
    pub fn new(store: ShardStore) -> Self {
        Self { store }
    }

    /// One compaction pass. Returns the number of records trimmed.
    pub fn compact_once(&self, now_ms: u64) -> EngineResult<u32> {
        let cutoff = now_ms.saturating_sub(WINDOW_MS);
        let trimmed = self.store.update_all(|mut record| {
            let pings_before = record.ping_history.len();
            let events_before = record.event_history.len();
            record.ping_history.retain(|s| s.t >= cutoff);
            record.event_history.retain(|e| e.t >= cutoff);
            let changed = record.ping_history.len() != pings_before
                || record.event_history.len() != events_before;
            changed.then_some(record)
        })?;
        if trimmed > 0 {
            debug!(trimmed, "history windows compacted");
        }
        Ok(trimmed)
    }

    /// Run the compaction loop until the shutdown signal flips.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = interval.as_secs(), "window compactor started");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    if let Err(e) = self.compact_once(epoch_ms()) {
                        error!(error = %e, "window compaction failed");
                    }
                }
                _ = shutdown.changed() => {
                    info!("window compactor shutting down");
                    break;
                }
            }
        }
    }
}
