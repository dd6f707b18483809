//! shardpulse-engine — the shard health-state engine.
//!
//! Three collaborators share the `ShardStore`:
//!
//! ```text
//! heartbeat ──► apply_heartbeat() ──► ShardStore
//!                                        ▲
//! timer ──► Sweeper::run()  ─────────────┤  demote silent shards
//! timer ──► Compactor::run() ────────────┘  trim 24h histories
//! ```
//!
//! Every mutation is a read-modify-write inside one store transaction,
//! so a heartbeat and a concurrent sweep on the same shard can never
//! interleave into an inconsistent record (e.g. ping set but status
//! still down). Different shards carry no ordering guarantee.

pub mod compactor;
pub mod error;
pub mod processor;
pub mod sweeper;

pub use compactor::{Compactor, WINDOW_MS};
pub use error::{EngineError, EngineResult};
pub use processor::{apply_heartbeat, delete_shard, HeartbeatReport};
pub use sweeper::Sweeper;

/// Current wall-clock time as epoch milliseconds.
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
