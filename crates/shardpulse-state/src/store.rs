//! ShardStore — redb-backed persistence for shard health records.
//!
//! Provides typed CRUD plus two read-modify-write primitives: `update`
//! for a single key and `update_all` for a batched pass over every
//! record. Both run inside one redb write transaction, so concurrent
//! callers touching the same shard serialize instead of interleaving.
//! Values are JSON-serialized into redb's `&[u8]` value column. The
//! store supports both on-disk and in-memory backends (the latter for
//! testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::{debug, warn};

use crate::error::{StateError, StateResult};
use crate::tables::SHARDS;
use crate::types::ShardRecord;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe shard store backed by redb.
#[derive(Clone)]
pub struct ShardStore {
    db: Arc<Database>,
}

impl ShardStore {
    /// Open (or create) a persistent shard store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "shard store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory shard store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory shard store opened");
        Ok(store)
    }

    /// Create the shards table if it doesn't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(SHARDS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Insert or replace a shard record.
    pub fn put(&self, record: &ShardRecord) -> StateResult<()> {
        let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(SHARDS).map_err(map_err!(Table))?;
            table
                .insert(record.id.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(id = %record.id, "shard record stored");
        Ok(())
    }

    /// Get a shard record by id.
    pub fn get(&self, id: &str) -> StateResult<Option<ShardRecord>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(SHARDS).map_err(map_err!(Table))?;
        match table.get(id).map_err(map_err!(Read))? {
            Some(guard) => {
                let record: ShardRecord =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// List all shard records.
    pub fn list_all(&self) -> StateResult<Vec<ShardRecord>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(SHARDS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let record: ShardRecord =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(record);
        }
        Ok(results)
    }

    /// Delete a shard record by id. Returns true if it existed.
    pub fn delete(&self, id: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(SHARDS).map_err(map_err!(Table))?;
            existed = table.remove(id).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%id, existed, "shard record deleted");
        Ok(existed)
    }

    /// Remove every shard record. Returns the number removed.
    pub fn clear_all(&self) -> StateResult<u32> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let count;
        {
            let mut table = txn.open_table(SHARDS).map_err(map_err!(Table))?;
            let keys: Vec<String> = table
                .iter()
                .map_err(map_err!(Read))?
                .filter_map(|entry| {
                    let (key, _) = entry.ok()?;
                    Some(key.value().to_string())
                })
                .collect();
            count = keys.len() as u32;
            for key in &keys {
                table.remove(key.as_str()).map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(count, "shard store cleared");
        Ok(count)
    }

    /// Atomic read-modify-write on one shard record.
    ///
    /// `f` receives the current record (if any) and returns the record
    /// to store, or `None` to leave the key unchanged. The whole cycle
    /// runs inside one write transaction; nothing partial is ever
    /// visible to other callers.
    pub fn update<F>(&self, id: &str, f: F) -> StateResult<Option<ShardRecord>>
    where
        F: FnOnce(Option<ShardRecord>) -> Option<ShardRecord>,
    {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let updated;
        {
            let mut table = txn.open_table(SHARDS).map_err(map_err!(Table))?;
            let existing = match table.get(id).map_err(map_err!(Read))? {
                Some(guard) => Some(
                    serde_json::from_slice::<ShardRecord>(guard.value())
                        .map_err(map_err!(Deserialize))?,
                ),
                None => None,
            };
            updated = f(existing);
            if let Some(ref record) = updated {
                let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
                table
                    .insert(id, value.as_slice())
                    .map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(updated)
    }

    /// Batched atomic update over every shard record.
    ///
    /// `f` receives each decoded record and returns the replacement, or
    /// `None` to leave that record untouched. All writes land in one
    /// transaction. Records whose stored bytes fail to decode are
    /// skipped with a warning so one bad row never blocks the rest of
    /// the run. Returns the number of records written back.
    pub fn update_all<F>(&self, mut f: F) -> StateResult<u32>
    where
        F: FnMut(ShardRecord) -> Option<ShardRecord>,
    {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let mut written = 0u32;
        {
            let mut table = txn.open_table(SHARDS).map_err(map_err!(Table))?;
            // The iterator borrows the table, so decode everything first.
            let mut records = Vec::new();
            for entry in table.iter().map_err(map_err!(Read))? {
                let (key, value) = entry.map_err(map_err!(Read))?;
                match serde_json::from_slice::<ShardRecord>(value.value()) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        warn!(id = key.value(), error = %e, "skipping undecodable shard record");
                    }
                }
            }
            for record in records {
                let id = record.id.clone();
                if let Some(next) = f(record) {
                    let value = serde_json::to_vec(&next).map_err(map_err!(Serialize))?;
                    table
                        .insert(id.as_str(), value.as_slice())
                        .map_err(map_err!(Write))?;
                    written += 1;
                }
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(written)
    }
}
