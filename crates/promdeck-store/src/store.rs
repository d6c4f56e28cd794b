//! SnapshotStore — snapshot persistence with retention.
//!
//! Wraps a [`KvBackend`] and keeps at most the two most recent snapshots:
//! before every insert, if two or more entries exist, the second entry in
//! newest-first key order is deleted. Values are JSON envelopes carrying
//! the raw exposition text plus its capture timestamp.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::backend::{KvBackend, RedbBackend};
use crate::error::{StoreResult, map_err};
use crate::types::{RawSnapshot, SnapshotEnvelope, SnapshotMeta, snapshot_key};

/// Thread-safe snapshot store over an injected key-value backend.
#[derive(Clone)]
pub struct SnapshotStore {
    backend: Arc<dyn KvBackend>,
}

impl SnapshotStore {
    /// Build a store over any [`KvBackend`] implementation.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Open (or create) a redb-backed store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Ok(Self::new(Arc::new(RedbBackend::open(path)?)))
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(Arc::new(RedbBackend::open_in_memory()?)))
    }

    /// Persist a snapshot under `metrics_<timestamp>`, evicting first if
    /// two snapshots are already stored.
    ///
    /// Eviction orders keys as strings, newest first, and drops the key at
    /// index 1. String order matches numeric order while every live
    /// timestamp has the same digit count, which holds for epoch-millis
    /// keys until the year 2286; existing databases depend on the key
    /// ordering, so it stays a plain string sort.
    pub fn save(&self, timestamp: u64, raw_text: &str) -> StoreResult<()> {
        let mut keys = self.backend.list()?;
        keys.sort_by(|a, b| b.cmp(a));
        if keys.len() >= 2 {
            self.backend.delete(&keys[1])?;
        }

        let envelope = SnapshotEnvelope {
            data: raw_text.to_string(),
            timestamp,
        };
        let value = serde_json::to_string(&envelope).map_err(map_err!(Serialize))?;
        self.backend.put(&snapshot_key(timestamp), &value)?;
        debug!(timestamp, bytes = raw_text.len(), "snapshot saved");
        Ok(())
    }

    /// Load the snapshot captured at `timestamp`, `None` if absent.
    pub fn load(&self, timestamp: u64) -> StoreResult<Option<RawSnapshot>> {
        let key = snapshot_key(timestamp);
        match self.backend.get(&key)? {
            Some(value) => {
                let envelope: SnapshotEnvelope =
                    serde_json::from_str(&value).map_err(map_err!(Deserialize))?;
                Ok(Some(RawSnapshot {
                    timestamp: envelope.timestamp,
                    text: envelope.data,
                }))
            }
            None => Ok(None),
        }
    }

    /// The most recent stored snapshots, newest first by envelope
    /// timestamp (numeric, unlike the eviction order), at most `limit`.
    pub fn recent(&self, limit: usize) -> StoreResult<Vec<SnapshotMeta>> {
        let mut entries = Vec::new();
        for key in self.backend.list()? {
            // A concurrent save can delete between list and get.
            let Some(value) = self.backend.get(&key)? else {
                continue;
            };
            let envelope: SnapshotEnvelope =
                serde_json::from_str(&value).map_err(map_err!(Deserialize))?;
            entries.push(SnapshotMeta {
                key,
                timestamp: envelope.timestamp,
            });
        }
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit);
        Ok(entries)
    }
}
