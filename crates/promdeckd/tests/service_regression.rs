//! Service regression tests.
//!
//! Drives the full router over an in-memory store: multipart uploads,
//! dashboard retrieval by timestamp, retention over HTTP, and the fixed
//! error messages clients scrape.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use promdeck_api::build_router;
use promdeck_store::SnapshotStore;

const BOUNDARY: &str = "X-PROMDECK-BOUNDARY";

const SAMPLE_METRICS: &str = "\
# HELP cloudflared_tcp_total_sessions Number of TCP sessions proxied.
cloudflared_tcp_total_sessions 18
edged_heap_bytes 3145728
proxy_connect_latency 42
requests_total{code=\"200\"} 1500
req_time_bucket{le=\"0.5\"} 3
req_time_bucket{le=\"+Inf\"} 9
req_time_sum 12
req_time_count 6
";

fn test_router() -> Router {
    build_router(SnapshotStore::open_in_memory().unwrap())
}

fn multipart_body(field: &str, payload: &str) -> String {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"metrics.txt\"\r\n\
         Content-Type: text/plain\r\n\
         \r\n\
         {payload}\r\n\
         --{BOUNDARY}--\r\n"
    )
}

fn upload_request(field: &str, payload: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, payload)))
        .unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ── Upload path ─────────────────────────────────────────────────

#[tokio::test]
async fn upload_renders_dashboard() {
    let router = test_router();

    let resp = router
        .oneshot(upload_request("metricsFile", SAMPLE_METRICS))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/html;charset=UTF-8"
    );
    let body = body_text(resp).await;
    assert!(body.contains("source ports used"));
    assert!(body.contains("freshly uploaded"));
    assert!(body.contains("requests_total"));
    assert!(body.contains("1,500"));
}

#[tokio::test]
async fn upload_without_file_field_rejected() {
    let router = test_router();

    let resp = router
        .oneshot(upload_request("wrongField", SAMPLE_METRICS))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "No metrics file uploaded");
}

#[tokio::test]
async fn upload_without_multipart_body_rejected() {
    let router = test_router();

    let req = Request::builder()
        .method("POST")
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "No metrics file uploaded");
}

#[tokio::test]
async fn upload_truncated_multipart_rejected() {
    let router = test_router();

    // Valid part headers, but the body ends before any closing boundary.
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"metricsFile\"; filename=\"metrics.txt\"\r\n\
         Content-Type: text/plain\r\n\
         \r\n\
         cloudflared_tcp_total_sessions 18\n"
    );
    let req = Request::builder()
        .method("POST")
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "No metrics file uploaded");
}

#[tokio::test]
async fn upload_invalid_format_rejected_and_store_untouched() {
    let router = test_router();

    let resp = router
        .clone()
        .oneshot(upload_request(
            "metricsFile",
            "this is definitely not prometheus\n",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_text(resp).await,
        "Invalid metrics file format. Please upload a valid Prometheus metrics file."
    );

    // Nothing was stored: the upload page still shows its empty state.
    let resp = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_text(resp).await;
    assert!(body.contains("No snapshots stored yet"));
}

#[tokio::test]
async fn upload_of_comments_only_accepted_with_empty_dashboard() {
    let router = test_router();

    // A comment line satisfies the format sniff even though no series
    // parses out of the payload.
    let resp = router
        .oneshot(upload_request(
            "metricsFile",
            "# HELP nothing here\n# TYPE nothing gauge\n",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("No gauges in this snapshot"));
    assert!(body.contains("No counters in this snapshot"));
    assert!(body.contains("No histograms in this snapshot"));
}

// ── Retrieval path ──────────────────────────────────────────────

#[tokio::test]
async fn retrieve_unknown_timestamp_not_found() {
    let router = test_router();

    let req = Request::builder()
        .uri("/?timestamp=1700000000000")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(resp).await, "Metrics not found");
}

#[tokio::test]
async fn retrieve_garbage_timestamp_not_found() {
    let router = test_router();

    let req = Request::builder()
        .uri("/?timestamp=yesterday")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_then_retrieve_roundtrip() {
    let router = test_router();

    let resp = router
        .clone()
        .oneshot(upload_request("metricsFile", SAMPLE_METRICS))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // The upload page links the stored snapshot by its timestamp.
    let resp = router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_text(resp).await;
    let marker = "/?timestamp=";
    let start = body.find(marker).expect("upload page links the snapshot") + marker.len();
    let timestamp: String = body[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    let resp = router
        .oneshot(
            Request::builder()
                .uri(format!("/?timestamp={timestamp}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("source ports used"));
    assert!(body.contains("UTC"));
    assert!(body.contains("1,500"));
}

// ── Retention over HTTP ─────────────────────────────────────────

#[tokio::test]
async fn retention_caps_listed_snapshots_at_two() {
    let router = test_router();

    for _ in 0..3 {
        let resp = router
            .clone()
            .oneshot(upload_request("metricsFile", SAMPLE_METRICS))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        // Distinct epoch-millis keys per upload.
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let resp = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_text(resp).await;

    assert_eq!(body.matches("/?timestamp=").count(), 2);
}

// ── Ambient surface ─────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok() {
    let router = test_router();

    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "{\"status\":\"ok\"}");
}

#[tokio::test]
async fn upload_page_is_html() {
    let router = test_router();

    let resp = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/html;charset=UTF-8"
    );
}
