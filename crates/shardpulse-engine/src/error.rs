//! Error types for the heartbeat engine.

use thiserror::Error;

use shardpulse_state::StateError;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while processing heartbeats or timer sweeps.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The underlying store read or write failed. Not retried; the
    /// record is left unchanged.
    #[error(transparent)]
    Storage(#[from] StateError),

    /// The heartbeat payload was missing required shape. Rejected
    /// before any state mutation.
    #[error("malformed report: {0}")]
    MalformedReport(String),

    /// Lookup or delete on an id the store has never seen.
    #[error("unknown shard: {0}")]
    UnknownShard(String),
}
