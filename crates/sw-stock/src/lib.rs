//! sw-stock
//!
//! Stock domain for brand monitoring:
//! - catalog products reduced to one aggregate snapshot per brand
//! - per-brand state machine deciding when a transition is announced
//! - alert text for announced transitions
//!
//! Deterministic, pure logic. No IO. No catalog calls.

mod aggregate;
mod alert;
mod transition;

pub use aggregate::aggregate;
pub use alert::{render_alert, Alert};
pub use transition::{decide, Decision};

use serde::{Deserialize, Serialize};

/// One purchasable variant of a product.
///
/// `inventory_quantity` may be absent upstream; absent counts as zero.
/// Negative quantities (oversold) are kept as-is and pull the product
/// towards depletion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub inventory_quantity: Option<i64>,
}

impl Variant {
    pub fn with_quantity(qty: i64) -> Self {
        Self {
            inventory_quantity: Some(qty),
        }
    }

    /// Variant with no quantity reported.
    pub fn untracked() -> Self {
        Self {
            inventory_quantity: None,
        }
    }
}

/// A catalog product belonging to exactly one brand.
///
/// Identity only matters for logging; aggregation looks at variants only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<i64>,
    pub title: String,
    pub variants: Vec<Variant>,
}

impl Product {
    pub fn new(title: impl Into<String>, variants: Vec<Variant>) -> Self {
        Self {
            id: None,
            title: title.into(),
            variants,
        }
    }

    /// Sum of variant quantities, missing values counted as 0.
    ///
    /// Saturates instead of overflowing; a catalog reporting quantities near
    /// `i64::MAX` is still "in stock".
    pub fn total_quantity(&self) -> i64 {
        self.variants
            .iter()
            .map(|v| v.inventory_quantity.unwrap_or(0))
            .fold(0i64, |acc, q| acc.saturating_add(q))
    }

    /// A product is out of stock iff its summed quantity is `<= 0`.
    pub fn is_out_of_stock(&self) -> bool {
        self.total_quantity() <= 0
    }
}

/// Aggregate stock facts for one brand at one point in time.
///
/// Invariant: `out_of_stock_products + in_stock_products == total_products`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandStockSnapshot {
    pub brand: String,
    pub total_products: usize,
    pub out_of_stock_products: usize,
    pub in_stock_products: usize,
    /// True iff the brand has products and every one of them is depleted.
    pub all_out_of_stock: bool,
}

/// Last announced state of a brand. Absence (`None`) means never observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockState {
    InStock,
    OutOfStock,
}

impl StockState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockState::InStock => "IN_STOCK",
            StockState::OutOfStock => "OUT_OF_STOCK",
        }
    }
}

impl std::fmt::Display for StockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which announcement a transition produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Every product of the brand ran out.
    Depleted,
    /// A previously depleted brand has stock again.
    Restocked,
}
