use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sw_notify::Delivery;
use sw_stock::{AlertKind, BrandStockSnapshot, StockState};
use uuid::Uuid;

/// What started a reconciliation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Webhook,
    Manual,
    Periodic,
    Cli,
}

/// Where a per-brand failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Catalog,
    StateStore,
}

/// Result of one brand inside a pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BrandOutcome {
    /// State already matched the snapshot.
    Unchanged {
        state: StockState,
        snapshot: BrandStockSnapshot,
    },
    /// First observation, recorded without an alert.
    Seeded {
        state: StockState,
        snapshot: BrandStockSnapshot,
    },
    /// A transition fired an alert. `state` is the state transitioned to.
    ///
    /// `committed` is false only under the re-arm policy when delivery failed;
    /// the stored state then still equals `previous`.
    Alerted {
        kind: AlertKind,
        previous: Option<StockState>,
        state: StockState,
        committed: bool,
        snapshot: BrandStockSnapshot,
        delivery: Delivery,
    },
    /// Nothing was decided; stored state untouched.
    Failed { stage: FailureStage, error: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandReport {
    pub brand: String,
    #[serde(flatten)]
    pub outcome: BrandOutcome,
}

impl BrandReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, BrandOutcome::Failed { .. })
    }

    pub fn alert_kind(&self) -> Option<AlertKind> {
        match &self.outcome {
            BrandOutcome::Alerted { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Structured result of one pass over every monitored brand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    pub pass_id: Uuid,
    pub trigger: Trigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub brands: Vec<BrandReport>,
}

impl PassReport {
    pub fn alerts(&self) -> impl Iterator<Item = &BrandReport> {
        self.brands.iter().filter(|b| b.alert_kind().is_some())
    }

    pub fn failures(&self) -> impl Iterator<Item = &BrandReport> {
        self.brands.iter().filter(|b| b.is_failed())
    }

    pub fn brand(&self, name: &str) -> Option<&BrandReport> {
        self.brands.iter().find(|b| b.brand == name)
    }
}
