//! sw-catalog
//!
//! Catalog boundary for stock monitoring.
//!
//! This crate owns the catalog source abstraction and the concrete HTTP
//! catalog client. It does **not** aggregate or remember anything; callers
//! (the reconciler) fetch products and hand them to `sw-stock`.
//!
//! Every call re-fetches from scratch. There is no cache: stock levels are
//! the monitored quantity and a stale page would hide a transition.

mod client;
mod pagination;

pub use client::{ShopifyCatalog, ShopifyCatalogConfig};
pub use pagination::parse_next_link;

use sw_stock::Product;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a [`CatalogSource`] may return.
///
/// Any error aborts the fetch for that brand; no partial product list is
/// ever returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The catalog answered with a non-success status.
    #[error("catalog upstream error status={status}: {reason}")]
    Upstream { status: u16, reason: String },
    /// Network or transport failure before a status was received.
    #[error("catalog transport error: {0}")]
    Transport(String),
    /// A response payload could not be decoded.
    #[error("catalog decode error: {0}")]
    Decode(String),
    /// The cursor chain did not terminate within the page budget.
    #[error("catalog pagination exceeded {pages} pages")]
    PageLimit { pages: usize },
}

// ---------------------------------------------------------------------------
// Catalog trait
// ---------------------------------------------------------------------------

/// Brand-filtered product listing.
///
/// Implementations must be `Send + Sync` so the reconciler can hold an
/// `Arc<dyn CatalogSource>` across tasks.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short name for logs (e.g. `"shopify"`).
    fn source_name(&self) -> &'static str;

    /// All products of `brand`, following pagination until exhausted.
    ///
    /// A brand with no products yields `Ok(vec![])`, not an error.
    async fn fetch_all_products(&self, brand: &str) -> Result<Vec<Product>, CatalogError>;
}
