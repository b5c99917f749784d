//! sw-runtime
//!
//! The reconciliation pass: for each monitored brand, fetch the catalog,
//! aggregate, compare with the remembered state, alert on a qualifying
//! transition, remember the new state.
//!
//! # Contracts
//! - A per-brand failure (catalog or state store) is reported in the
//!   [`PassReport`] and leaves that brand's stored state untouched. Other
//!   brands still run.
//! - A brand step is serialized against concurrent passes for the same
//!   brand; the same transition is never alerted twice.
//! - Notification failures never abort a pass. Whether they re-arm the
//!   transition is the [`DeliveryPolicy`].

mod locks;
mod reconciler;
mod report;
pub mod wiring;

pub use reconciler::{DeliveryPolicy, Reconciler, ReconcilerConfig};
pub use report::{BrandOutcome, BrandReport, FailureStage, PassReport, Trigger};
