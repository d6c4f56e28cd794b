//! Key-value backend seam for snapshot persistence.
//!
//! The retention policy in [`crate::store`] is written against the
//! [`KvBackend`] trait so that tests can substitute a scriptable fake and
//! drive exact interleavings. Production uses [`RedbBackend`], a single
//! redb table with `&str` keys and JSON-envelope `&str` values.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use tracing::debug;

use crate::error::{StoreResult, map_err};

/// Snapshot envelopes keyed by `metrics_{epoch_millis}`.
const SNAPSHOTS: TableDefinition<&str, &str> = TableDefinition::new("snapshots");

/// Minimal flat key-value surface the snapshot store runs on.
pub trait KvBackend: Send + Sync {
    /// All keys currently stored, in backend order.
    fn list(&self) -> StoreResult<Vec<String>>;

    /// Value under `key`, `None` if absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Insert or overwrite `key`.
    fn put(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Returns true if it existed.
    fn delete(&self, key: &str) -> StoreResult<bool>;
}

/// redb-backed implementation of [`KvBackend`].
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open (or create) a persistent backend at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let backend = Self { db: Arc::new(db) };
        backend.ensure_table()?;
        debug!(?path, "snapshot backend opened");
        Ok(backend)
    }

    /// Create an ephemeral in-memory backend (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let backend = Self { db: Arc::new(db) };
        backend.ensure_table()?;
        debug!("in-memory snapshot backend opened");
        Ok(backend)
    }

    /// Create the snapshots table if it doesn't exist yet.
    fn ensure_table(&self) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(SNAPSHOTS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }
}

impl KvBackend for RedbBackend {
    fn list(&self) -> StoreResult<Vec<String>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(SNAPSHOTS).map_err(map_err!(Table))?;
        let mut keys = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, _) = entry.map_err(map_err!(Read))?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(SNAPSHOTS).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => Ok(Some(guard.value().to_string())),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(SNAPSHOTS).map_err(map_err!(Table))?;
            table.insert(key, value).map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, "snapshot entry stored");
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(SNAPSHOTS).map_err(map_err!(Table))?;
            existed = table.remove(key).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, existed, "snapshot entry deleted");
        Ok(existed)
    }
}
