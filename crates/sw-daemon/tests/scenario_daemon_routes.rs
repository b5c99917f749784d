//! Scenario: health, status, manual reconcile, stream.
//!
//! # Invariants under test
//! - `/v1/health` is always 200 with the service name.
//! - `/v1/status` lists every configured brand; unseen brands have a null
//!   state; `last_pass` is null until a pass completes.
//! - `daemon_uptime_secs` counts from state construction, not from the first
//!   status request.
//! - `POST /v1/reconcile` runs a pass inline and returns the full report;
//!   status reflects it afterwards.
//! - `/v1/stream` answers as an SSE stream.
//!
//! All tests are in-process; no network.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sw_daemon::{routes, state};
use sw_notify::Notifier;
use sw_runtime::{DeliveryPolicy, Reconciler, ReconcilerConfig};
use sw_signature::SignatureVerifier;
use sw_store::InMemoryStateStore;
use sw_testkit::{products_with_totals, sold_out, FakeCatalog, RecordingSink};
use tower::ServiceExt; // oneshot

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn call(router: axum::Router, req: Request<axum::body::Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

fn get(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

fn app(catalog: Arc<FakeCatalog>, sink: Arc<RecordingSink>) -> Arc<state::AppState> {
    let reconciler = Reconciler::new(
        catalog,
        Arc::new(InMemoryStateStore::new()),
        Notifier::new(sink, Duration::from_secs(1)),
        ReconcilerConfig {
            brands: vec!["Acme".to_string(), "Globex".to_string()],
            policy: DeliveryPolicy::FireAndForget,
            inter_brand_delay: Duration::ZERO,
        },
    );
    Arc::new(
        state::AppState::new(
            Arc::new(reconciler),
            SignatureVerifier::new("s3cr3t"),
            "X-Shopify-Hmac-Sha256",
        )
        .with_config_hash("abc123"),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_ok() {
    let st = app(Arc::new(FakeCatalog::new()), Arc::new(RecordingSink::new()));
    let (status, body) = call(routes::build_router(st), get("/v1/health")).await;

    assert_eq!(status, StatusCode::OK);
    let json = parse_json(body);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "sw-daemon");
}

#[tokio::test]
async fn fresh_status_lists_brands_without_state() {
    let st = app(Arc::new(FakeCatalog::new()), Arc::new(RecordingSink::new()));
    let (status, body) = call(routes::build_router(st), get("/v1/status")).await;

    assert_eq!(status, StatusCode::OK);
    let json = parse_json(body);
    assert_eq!(json["config_hash"], "abc123");
    assert_eq!(json["delivery_policy"], "fire_and_forget");
    assert_eq!(json["brands"][0]["brand"], "Acme");
    assert!(json["brands"][0]["state"].is_null());
    assert_eq!(json["brands"][1]["brand"], "Globex");
    assert!(json["last_pass"].is_null());
}

#[tokio::test]
async fn manual_reconcile_returns_report_and_updates_status() {
    let catalog = Arc::new(FakeCatalog::new());
    catalog.set_products("Acme", sold_out(2));
    catalog.set_products("Globex", products_with_totals(&[4, 0]));
    let sink = Arc::new(RecordingSink::new());
    let st = app(catalog, sink.clone());

    let req = Request::builder()
        .method("POST")
        .uri("/v1/reconcile")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, body) = call(routes::build_router(Arc::clone(&st)), req).await;

    assert_eq!(status, StatusCode::OK);
    let report = parse_json(body);
    assert_eq!(report["trigger"], "manual");
    assert_eq!(report["brands"][0]["outcome"], "alerted");
    assert_eq!(report["brands"][1]["outcome"], "seeded");
    assert_eq!(sink.count(), 1);

    let (_, body) = call(routes::build_router(Arc::clone(&st)), get("/v1/status")).await;
    let json = parse_json(body);
    assert_eq!(json["brands"][0]["state"], "OUT_OF_STOCK");
    assert_eq!(json["brands"][1]["state"], "IN_STOCK");
    assert_eq!(json["last_pass"]["trigger"], "manual");
    assert_eq!(json["last_pass"]["alerts"], 1);
    assert_eq!(json["last_pass"]["failures"], 0);
    assert_eq!(json["last_pass"]["pass_id"], report["pass_id"]);
}

#[tokio::test]
async fn stream_is_server_sent_events() {
    let st = app(Arc::new(FakeCatalog::new()), Arc::new(RecordingSink::new()));
    let resp = routes::build_router(st)
        .oneshot(get("/v1/stream"))
        .await
        .expect("oneshot failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(ct.starts_with("text/event-stream"), "{ct}");
}

#[tokio::test]
async fn uptime_counts_from_startup_not_first_status_call() {
    let st = app(Arc::new(FakeCatalog::new()), Arc::new(RecordingSink::new()));
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let (status, body) = call(routes::build_router(st), get("/v1/status")).await;

    assert_eq!(status, StatusCode::OK);
    let json = parse_json(body);
    let uptime = json["daemon_uptime_secs"].as_u64().expect("uptime is a number");
    assert!(uptime >= 1, "uptime was {uptime}");
}
