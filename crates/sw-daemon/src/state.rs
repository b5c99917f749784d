//! Shared runtime state for sw-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. Every pass, whatever
//! triggered it, goes through [`AppState::run_pass`] so the status view and
//! the SSE bus see the same history.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sw_notify::Delivery;
use sw_runtime::{BrandOutcome, PassReport, Reconciler, Trigger};
use sw_signature::SignatureVerifier;
use sw_stock::AlertKind;
use tokio::sync::{broadcast, RwLock};
use tracing::info;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// BusMsg: SSE event bus payload
// ---------------------------------------------------------------------------

/// Messages broadcast over the internal event bus and surfaced as SSE events.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMsg {
    Heartbeat {
        ts_millis: i64,
    },
    Alert {
        pass_id: Uuid,
        brand: String,
        kind: AlertKind,
        delivery: Delivery,
    },
    Pass(PassSummary),
}

impl BusMsg {
    pub fn event_name(&self) -> &'static str {
        match self {
            BusMsg::Heartbeat { .. } => "heartbeat",
            BusMsg::Alert { .. } => "alert",
            BusMsg::Pass(_) => "pass",
        }
    }
}

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// PassSummary
// ---------------------------------------------------------------------------

/// Counts-only view of a [`PassReport`], kept as "last pass" and broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    pub pass_id: Uuid,
    pub trigger: Trigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub brands: usize,
    pub alerts: usize,
    pub failures: usize,
}

impl From<&PassReport> for PassSummary {
    fn from(r: &PassReport) -> Self {
        Self {
            pass_id: r.pass_id,
            trigger: r.trigger,
            started_at: r.started_at,
            finished_at: r.finished_at,
            brands: r.brands.len(),
            alerts: r.alerts().count(),
            failures: r.failures().count(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    /// Broadcast bus for SSE.
    pub bus: broadcast::Sender<BusMsg>,
    pub build: BuildInfo,
    pub reconciler: Arc<Reconciler>,
    pub verifier: SignatureVerifier,
    /// Lower-cased name of the header carrying the webhook signature.
    pub signature_header: String,
    /// Hash of the effective config, when loaded from YAML.
    pub config_hash: Option<String>,
    pub last_pass: RwLock<Option<PassSummary>>,
}

impl AppState {
    pub fn new(
        reconciler: Arc<Reconciler>,
        verifier: SignatureVerifier,
        signature_header: &str,
    ) -> Self {
        // Start the uptime clock at construction, not at the first status call.
        let _ = uptime_secs();
        let (bus, _rx) = broadcast::channel::<BusMsg>(1024);
        Self {
            bus,
            build: BuildInfo {
                service: "sw-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            reconciler,
            verifier,
            signature_header: signature_header.trim().to_ascii_lowercase(),
            config_hash: None,
            last_pass: RwLock::new(None),
        }
    }

    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Run one pass and publish its outcome (last-pass slot + bus).
    pub async fn run_pass(&self, pass_id: Uuid, trigger: Trigger) -> PassReport {
        let report = self.reconciler.run_pass_with_id(pass_id, trigger).await;

        for b in &report.brands {
            if let BrandOutcome::Alerted { kind, delivery, .. } = &b.outcome {
                let _ = self.bus.send(BusMsg::Alert {
                    pass_id,
                    brand: b.brand.clone(),
                    kind: *kind,
                    delivery: delivery.clone(),
                });
            }
        }

        let summary = PassSummary::from(&report);
        *self.last_pass.write().await = Some(summary.clone());
        let _ = self.bus.send(BusMsg::Pass(summary));
        report
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Seconds since the clock was first read; `AppState::new` reads it.
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}

/// Spawn a background task that emits a heartbeat SSE every `interval`.
pub fn spawn_heartbeat(bus: broadcast::Sender<BusMsg>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let ts = Utc::now().timestamp_millis();
            let _ = bus.send(BusMsg::Heartbeat { ts_millis: ts });
        }
    });
}

/// Spawn a background task that runs a full pass every `interval`.
///
/// The first pass happens one interval after startup. A pass that overruns
/// the interval delays the next tick instead of stacking passes.
pub fn spawn_periodic_reconcile(state: Arc<AppState>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let pass_id = Uuid::new_v4();
            info!(%pass_id, "periodic reconcile");
            state.run_pass(pass_id, Trigger::Periodic).await;
        }
    });
}
