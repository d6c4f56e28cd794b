//! Upload and retrieval handlers.
//!
//! The upload flow is validate → parse → persist → render; retrieval is
//! load → parse → render, with GET / falling back to the upload page
//! when no timestamp is given. Both return full HTML documents, so
//! responses set the content type explicitly.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, info};

use promdeck_dashboard::{DashboardView, render_dashboard, render_upload_page};
use promdeck_exposition::{looks_like_exposition, parse};

use crate::ApiState;
use crate::error::{ApiError, ApiResult};

/// Content type on every HTML response, matching what stored clients expect.
pub(crate) const HTML_CONTENT_TYPE: &str = "text/html;charset=UTF-8";

/// Multipart field carrying the uploaded snapshot.
const UPLOAD_FIELD: &str = "metricsFile";

/// How many stored snapshots the upload page lists.
const RECENT_LIMIT: usize = 2;

fn html_response(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HTML_CONTENT_TYPE)],
        body,
    )
        .into_response()
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[derive(Deserialize)]
pub struct ViewParams {
    pub timestamp: Option<String>,
}

/// POST /
pub async fn upload(
    State(state): State<ApiState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    // A request without a usable multipart body carries no file either.
    let mut multipart = multipart.map_err(|_| ApiError::MissingFile)?;

    let mut uploaded: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::MissingFile)?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let text = field.text().await.map_err(|_| ApiError::MissingFile)?;
            uploaded = Some(text);
            break;
        }
    }
    let text = uploaded.ok_or(ApiError::MissingFile)?;

    if !looks_like_exposition(&text) {
        debug!(bytes = text.len(), "rejecting upload that fails format sniff");
        return Err(ApiError::InvalidFormat);
    }

    let parsed = parse(&text);
    if parsed.is_empty() {
        // Comment-only payloads pass the sniff but parse to nothing.
        debug!("no series recognized in uploaded snapshot");
    }
    let timestamp = epoch_millis();
    state.store.save(timestamp, &text)?;
    info!(timestamp, bytes = text.len(), "metrics snapshot stored");

    Ok(html_response(render_dashboard(DashboardView::build(
        &parsed, None,
    ))))
}

/// GET /
pub async fn index(
    State(state): State<ApiState>,
    Query(params): Query<ViewParams>,
) -> ApiResult<Response> {
    match params.timestamp {
        Some(raw) => {
            // Non-numeric values cannot name a stored key.
            let timestamp: u64 = raw.parse().map_err(|_| ApiError::SnapshotNotFound)?;
            let snapshot = state
                .store
                .load(timestamp)?
                .ok_or(ApiError::SnapshotNotFound)?;
            debug!(timestamp, "rendering stored snapshot");

            let parsed = parse(&snapshot.text);
            Ok(html_response(render_dashboard(DashboardView::build(
                &parsed,
                Some(snapshot.timestamp),
            ))))
        }
        None => {
            let recent = state.store.recent(RECENT_LIMIT)?;
            Ok(html_response(render_upload_page(&recent)))
        }
    }
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
