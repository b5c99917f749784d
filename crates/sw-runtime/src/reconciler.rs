use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sw_catalog::CatalogSource;
use sw_notify::Notifier;
use sw_stock::{aggregate, decide, render_alert, AlertKind, BrandStockSnapshot, Decision};
use sw_store::StateStore;
use tracing::{info, warn};
use uuid::Uuid;

use crate::locks::BrandLocks;
use crate::report::{BrandOutcome, BrandReport, FailureStage, PassReport, Trigger};

/// What happens to a transition whose alert could not be delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Commit the new state before sending; a failed send is only logged.
    /// The alert is not retried.
    #[default]
    FireAndForget,
    /// Commit the new state only after a successful send, so the next pass
    /// detects the same transition and alerts again.
    Rearm,
}

#[derive(Clone, Debug)]
pub struct ReconcilerConfig {
    /// Monitored brands, processed in this order.
    pub brands: Vec<String>,
    pub policy: DeliveryPolicy,
    /// Pause between consecutive brands inside one pass (catalog rate limits).
    pub inter_brand_delay: Duration,
}

/// Runs reconciliation passes: fetch, aggregate, compare with stored state,
/// alert on a qualifying transition.
///
/// Each brand step runs under that brand's lock, so concurrent passes
/// (webhook + periodic + manual) serialize per brand and a transition is
/// alerted at most once.
pub struct Reconciler {
    catalog: Arc<dyn CatalogSource>,
    store: Arc<dyn StateStore>,
    notifier: Notifier,
    cfg: ReconcilerConfig,
    locks: BrandLocks,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("catalog", &self.catalog.source_name())
            .field("notifier", &self.notifier)
            .field("cfg", &self.cfg)
            .finish()
    }
}

impl Reconciler {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        store: Arc<dyn StateStore>,
        notifier: Notifier,
        cfg: ReconcilerConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            notifier,
            cfg,
            locks: BrandLocks::default(),
        }
    }

    pub fn brands(&self) -> &[String] {
        &self.cfg.brands
    }

    pub fn policy(&self) -> DeliveryPolicy {
        self.cfg.policy
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// One pass over every configured brand, sequentially.
    ///
    /// A failing brand is reported and skipped; it never aborts the pass.
    pub async fn run_pass(&self, trigger: Trigger) -> PassReport {
        self.run_pass_with_id(Uuid::new_v4(), trigger).await
    }

    /// Same as [`Reconciler::run_pass`] with a caller-chosen id, for callers
    /// that acknowledge a pass before it runs.
    pub async fn run_pass_with_id(&self, pass_id: Uuid, trigger: Trigger) -> PassReport {
        let started_at = Utc::now();
        info!(%pass_id, ?trigger, brands = self.cfg.brands.len(), "reconcile pass started");

        let mut brands = Vec::with_capacity(self.cfg.brands.len());
        for (i, brand) in self.cfg.brands.iter().enumerate() {
            if i > 0 && !self.cfg.inter_brand_delay.is_zero() {
                tokio::time::sleep(self.cfg.inter_brand_delay).await;
            }
            brands.push(self.reconcile_brand(brand).await);
        }

        let report = PassReport {
            pass_id,
            trigger,
            started_at,
            finished_at: Utc::now(),
            brands,
        };
        info!(
            %pass_id,
            alerts = report.alerts().count(),
            failures = report.failures().count(),
            "reconcile pass finished"
        );
        report
    }

    /// Reconcile a single brand. Holds the brand lock for the whole step.
    pub async fn reconcile_brand(&self, brand: &str) -> BrandReport {
        let _guard = self.locks.lock(brand).await;
        let outcome = self.step(brand).await;
        BrandReport {
            brand: brand.to_string(),
            outcome,
        }
    }

    async fn step(&self, brand: &str) -> BrandOutcome {
        let products = match self.catalog.fetch_all_products(brand).await {
            Ok(p) => p,
            Err(e) => {
                warn!(brand, source = self.catalog.source_name(), error = %e, "catalog fetch failed; brand skipped");
                return BrandOutcome::Failed {
                    stage: FailureStage::Catalog,
                    error: e.to_string(),
                };
            }
        };

        let snapshot = aggregate(brand, &products);

        let previous = match self.store.get(brand).await {
            Ok(s) => s,
            Err(e) => return store_failed(brand, &e),
        };

        let decision = decide(previous, &snapshot);
        match decision.alert {
            None => self.commit_silent(brand, decision, snapshot).await,
            Some(kind) => self.commit_alert(brand, kind, decision, snapshot).await,
        }
    }

    async fn commit_silent(
        &self,
        brand: &str,
        decision: Decision,
        snapshot: BrandStockSnapshot,
    ) -> BrandOutcome {
        if !decision.changes_state() {
            return BrandOutcome::Unchanged {
                state: decision.next,
                snapshot,
            };
        }
        if let Err(e) = self.store.set(brand, decision.next).await {
            return store_failed(brand, &e);
        }
        info!(brand, state = %decision.next, "first observation recorded");
        BrandOutcome::Seeded {
            state: decision.next,
            snapshot,
        }
    }

    async fn commit_alert(
        &self,
        brand: &str,
        kind: AlertKind,
        decision: Decision,
        snapshot: BrandStockSnapshot,
    ) -> BrandOutcome {
        let alert = render_alert(kind, &snapshot, Utc::now());
        info!(
            brand,
            ?kind,
            from = decision.previous.map(|s| s.as_str()).unwrap_or("none"),
            to = %decision.next,
            "stock transition"
        );

        let (delivery, committed) = match self.cfg.policy {
            DeliveryPolicy::FireAndForget => {
                if let Err(e) = self.store.set(brand, decision.next).await {
                    return store_failed(brand, &e);
                }
                (self.notifier.notify(&alert.subject, &alert.body).await, true)
            }
            DeliveryPolicy::Rearm => {
                let delivery = self.notifier.notify(&alert.subject, &alert.body).await;
                if !delivery.is_sent() {
                    warn!(brand, ?kind, "alert not delivered; transition left re-armed");
                    (delivery, false)
                } else if let Err(e) = self.store.set(brand, decision.next).await {
                    // Sent but not recorded: the next pass will alert again.
                    return store_failed(brand, &e);
                } else {
                    (delivery, true)
                }
            }
        };

        BrandOutcome::Alerted {
            kind,
            previous: decision.previous,
            state: decision.next,
            committed,
            snapshot,
            delivery,
        }
    }
}

fn store_failed(brand: &str, e: &sw_store::StoreError) -> BrandOutcome {
    warn!(brand, error = %e, "state store failed; brand skipped");
    BrandOutcome::Failed {
        stage: FailureStage::StateStore,
        error: e.to_string(),
    }
}
