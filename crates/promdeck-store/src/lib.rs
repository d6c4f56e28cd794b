//! promdeck-store — snapshot persistence for Promdeck.
//!
//! Backed by [redb](https://docs.rs/redb) behind a small key-value trait,
//! this crate owns the raw uploaded snapshots and the retention policy
//! that caps them at the two most recent.
//!
//! # Architecture
//!
//! Snapshots are JSON envelopes (`{"data", "timestamp"}`) stored under
//! `metrics_<epoch_millis>` keys in a single table. The [`SnapshotStore`]
//! holds an `Arc<dyn KvBackend>`, is `Clone` + `Send` + `Sync`, and can be
//! shared across async tasks; tests swap the backend for an in-memory
//! fake to script concurrency interleavings.

pub mod backend;
pub mod error;
pub mod store;
pub mod types;

pub use backend::{KvBackend, RedbBackend};
pub use error::{StoreError, StoreResult};
pub use store::SnapshotStore;
pub use types::{KEY_PREFIX, RawSnapshot, SnapshotEnvelope, SnapshotMeta, snapshot_key};
