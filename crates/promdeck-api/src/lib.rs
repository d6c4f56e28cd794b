//! promdeck-api — HTTP surface for Promdeck.
//!
//! Wires the snapshot store, exposition parser, and dashboard renderer
//! into an axum router.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/` | Multipart snapshot upload (`metricsFile` field) |
//! | GET | `/?timestamp=<millis>` | Dashboard for a stored snapshot |
//! | GET | `/` | Upload page with recent snapshots |
//! | GET | `/health` | Liveness probe |

pub mod error;
pub mod handlers;

use axum::Router;
use axum::routing::get;
use promdeck_store::SnapshotStore;

pub use error::{ApiError, ApiResult};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: SnapshotStore,
}

/// Build the complete router over one snapshot store.
pub fn build_router(store: SnapshotStore) -> Router {
    let state = ApiState { store };

    Router::new()
        .route("/", get(handlers::index).post(handlers::upload))
        .route("/health", get(handlers::health))
        .with_state(state)
}
