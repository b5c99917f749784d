//! Per-brand transition function.
//!
//! # States
//! `None` (never observed), `Some(InStock)`, `Some(OutOfStock)`.
//!
//! # Rules
//! | previous             | snapshot                              | alert     | next         |
//! |----------------------|---------------------------------------|-----------|--------------|
//! | not `OutOfStock`     | `all_out_of_stock`                    | Depleted  | `OutOfStock` |
//! | `OutOfStock`         | not depleted and `in_stock > 0`       | Restocked | `InStock`    |
//! | `None`               | anything else                         | none      | `InStock`    |
//! | `Some(s)`            | anything else                         | none      | `s`          |
//!
//! The first-observation asymmetry is deliberate: a brand first seen depleted
//! still alerts, a brand first seen in stock is seeded silently.

use serde::{Deserialize, Serialize};

use crate::{AlertKind, BrandStockSnapshot, StockState};

/// Outcome of one transition decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub previous: Option<StockState>,
    pub next: StockState,
    pub alert: Option<AlertKind>,
}

impl Decision {
    /// `true` when the stored state must be written.
    pub fn changes_state(&self) -> bool {
        self.previous != Some(self.next)
    }

    /// `true` for a silent first observation.
    pub fn is_seed(&self) -> bool {
        self.previous.is_none() && self.alert.is_none()
    }
}

/// Decide the next state (and whether to alert) from the remembered state
/// and a fresh snapshot.
pub fn decide(previous: Option<StockState>, snapshot: &BrandStockSnapshot) -> Decision {
    let was_out = previous == Some(StockState::OutOfStock);

    if !was_out && snapshot.all_out_of_stock {
        return Decision {
            previous,
            next: StockState::OutOfStock,
            alert: Some(AlertKind::Depleted),
        };
    }

    if was_out && !snapshot.all_out_of_stock && snapshot.in_stock_products > 0 {
        return Decision {
            previous,
            next: StockState::InStock,
            alert: Some(AlertKind::Restocked),
        };
    }

    Decision {
        previous,
        next: previous.unwrap_or(StockState::InStock),
        alert: None,
    }
}
