//! Request and response types for the sw-daemon HTTP endpoints.
//!
//! `Serialize + Deserialize` so Axum can encode them and tests can decode
//! them. No business logic lives here.

use serde::{Deserialize, Serialize};
use sw_runtime::DeliveryPolicy;
use sw_stock::StockState;
use uuid::Uuid;

use crate::state::PassSummary;

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// /v1/status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandStatus {
    pub brand: String,
    /// `None` until the brand has been observed once.
    pub state: Option<StockState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub daemon_uptime_secs: u64,
    pub service: String,
    pub version: String,
    pub config_hash: Option<String>,
    pub delivery_policy: DeliveryPolicy,
    pub brands: Vec<BrandStatus>,
    pub last_pass: Option<PassSummary>,
}

// ---------------------------------------------------------------------------
// /v1/webhooks/catalog
// ---------------------------------------------------------------------------

/// The subset of a product webhook body that is logged. Nothing else is
/// read: any catalog change triggers a full pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogWebhookPayload {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAccepted {
    pub accepted: bool,
    /// Id the background pass will report under.
    pub pass_id: Uuid,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
