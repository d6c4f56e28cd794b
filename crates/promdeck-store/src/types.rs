//! Domain types for stored snapshots.

use serde::{Deserialize, Serialize};

/// Every snapshot key is this prefix plus the decimal epoch-millis timestamp.
pub const KEY_PREFIX: &str = "metrics_";

/// Storage key for a snapshot captured at `timestamp` (epoch millis).
pub fn snapshot_key(timestamp: u64) -> String {
    format!("{KEY_PREFIX}{timestamp}")
}

/// One uploaded metrics payload plus its capture timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSnapshot {
    /// Capture time in epoch millis, as recorded in the stored envelope.
    pub timestamp: u64,
    /// The uploaded exposition text, byte-for-byte as received.
    pub text: String,
}

/// Listing entry for a stored snapshot: its key and capture timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotMeta {
    pub key: String,
    pub timestamp: u64,
}

/// Persisted wire format: the JSON value stored under each snapshot key.
///
/// Field names and shapes are a compatibility surface; existing databases
/// hold envelopes in exactly this form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    pub data: String,
    pub timestamp: u64,
}
