//! redb table definitions for the ShardPulse shard store.
//!
//! A single table holds every shard record, `&str` keys (the shard id)
//! and `&[u8]` values (JSON-serialized `ShardRecord`).

use redb::TableDefinition;

/// Shard records keyed by `{shard_id}`.
pub const SHARDS: TableDefinition<&str, &[u8]> = TableDefinition::new("shards");
