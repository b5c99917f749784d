//! Axum router and all HTTP handlers for sw-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. Tests compose the bare router directly.

use std::{convert::Infallible, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use sw_runtime::Trigger;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    api_types::{
        BrandStatus, CatalogWebhookPayload, ErrorResponse, HealthResponse, StatusResponse,
        WebhookAccepted,
    },
    state::{uptime_secs, AppState, BusMsg},
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (tracing) are **not** applied here; `main.rs` attaches
/// them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/status", get(status_handler))
        .route("/v1/stream", get(stream))
        .route("/v1/webhooks/catalog", post(catalog_webhook))
        .route("/v1/reconcile", post(reconcile_now))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service.to_string(),
            version: st.build.version.to_string(),
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/status
// ---------------------------------------------------------------------------

pub(crate) async fn status_handler(State(st): State<Arc<AppState>>) -> Response {
    let entries = match st.reconciler.store().entries().await {
        Ok(e) => e,
        Err(e) => {
            warn!(error = %e, "status: state store unreadable");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: format!("STATE_UNAVAILABLE: {e}"),
                }),
            )
                .into_response();
        }
    };

    let brands = st
        .reconciler
        .brands()
        .iter()
        .map(|b| BrandStatus {
            brand: b.clone(),
            state: entries.get(b).copied(),
        })
        .collect();

    let last_pass = st.last_pass.read().await.clone();

    (
        StatusCode::OK,
        Json(StatusResponse {
            daemon_uptime_secs: uptime_secs(),
            service: st.build.service.to_string(),
            version: st.build.version.to_string(),
            config_hash: st.config_hash.clone(),
            delivery_policy: st.reconciler.policy(),
            brands,
            last_pass,
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// POST /v1/webhooks/catalog
// ---------------------------------------------------------------------------

/// Inbound catalog change notification.
///
/// # Order of checks
/// 1. Signature over the raw body. Any failure is `401` and nothing else
///    happens; the body is not parsed.
/// 2. Body parsed for logging only. A body that does not parse is still
///    accepted: the signature proved the sender.
/// 3. A full pass is spawned and `202` returned with its id.
pub(crate) async fn catalog_webhook(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let claimed = headers
        .get(st.signature_header.as_str())
        .and_then(|v| v.to_str().ok());

    if !st.verifier.verify(&body, claimed) {
        warn!(
            has_signature = claimed.is_some(),
            body_len = body.len(),
            "webhook rejected: signature verification failed"
        );
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "AUTH_FAILED: signature verification failed".to_string(),
            }),
        )
            .into_response();
    }

    let topic = headers
        .get("x-shopify-topic")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    match serde_json::from_slice::<CatalogWebhookPayload>(&body) {
        Ok(p) => info!(
            topic,
            product_id = ?p.id,
            vendor = p.vendor.as_deref().unwrap_or(""),
            "catalog webhook accepted"
        ),
        Err(e) => warn!(topic, error = %e, "catalog webhook payload not understood; reconciling anyway"),
    }

    let pass_id = Uuid::new_v4();
    let bg = Arc::clone(&st);
    tokio::spawn(async move {
        bg.run_pass(pass_id, Trigger::Webhook).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(WebhookAccepted {
            accepted: true,
            pass_id,
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// POST /v1/reconcile
// ---------------------------------------------------------------------------

/// Operator-triggered pass. Runs inline and returns the full report.
pub(crate) async fn reconcile_now(State(st): State<Arc<AppState>>) -> Response {
    let pass_id = Uuid::new_v4();
    info!(%pass_id, "manual reconcile requested");
    let report = st.run_pass(pass_id, Trigger::Manual).await;
    (StatusCode::OK, Json(report)).into_response()
}

// ---------------------------------------------------------------------------
// GET /v1/stream
// ---------------------------------------------------------------------------

pub(crate) async fn stream(State(st): State<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    let rx = st.bus.subscribe();
    let events = broadcast_to_sse(rx);

    (headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

fn broadcast_to_sse(
    rx: broadcast::Receiver<BusMsg>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|msg| async move {
        // Lagged receivers skip what they missed.
        let m = msg.ok()?;
        let data = serde_json::to_string(&m).ok()?;
        Some(Ok(Event::default().event(m.event_name()).data(data)))
    })
}
