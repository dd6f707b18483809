//! shardpulse-state — embedded shard store for ShardPulse.
//!
//! Backed by [redb](https://docs.rs/redb), provides persistent and
//! in-memory storage for shard health records.
//!
//! # Architecture
//!
//! `ShardRecord`s are JSON-serialized into redb's `&[u8]` value column,
//! keyed by shard id. All read-modify-write cycles happen inside a
//! single redb write transaction, which gives the per-key atomicity
//! the heartbeat engine and the timer jobs rely on: a heartbeat and a
//! concurrent sweep touching the same shard serialize on the write
//! transaction and can never interleave into a half-applied state.
//!
//! The `ShardStore` is `Clone` + `Send` + `Sync` (backed by
//! `Arc<Database>`) and can be shared across async tasks.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::ShardStore;
pub use types::*;
