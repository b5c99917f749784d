//! sw-testkit
//!
//! Deterministic in-process fakes used by scenario tests across the
//! workspace. No network I/O, no randomness.
//!
//! - [`FakeCatalog`]: scripted per-brand product lists or errors.
//! - [`RecordingSink`] / [`FailingSink`] / [`StallingSink`]: notification
//!   sinks that record, refuse, or never finish.
//! - product builders for the common shapes.

mod catalog;
mod sinks;

pub use catalog::FakeCatalog;
pub use sinks::{FailingSink, RecordingSink, SentAlert, StallingSink};

use sw_stock::{Product, Variant};

/// One product per entry, each with a single variant of that quantity.
pub fn products_with_totals(totals: &[i64]) -> Vec<Product> {
    totals
        .iter()
        .enumerate()
        .map(|(i, q)| {
            Product::new(
                format!("Product {}", i + 1),
                vec![Variant::with_quantity(*q)],
            )
        })
        .collect()
}

/// One product whose variants carry the given quantities.
pub fn product_with_variants(title: &str, quantities: &[i64]) -> Product {
    Product::new(
        title,
        quantities.iter().map(|q| Variant::with_quantity(*q)).collect(),
    )
}

/// `n` products, all at zero.
pub fn sold_out(n: usize) -> Vec<Product> {
    products_with_totals(&vec![0; n])
}

/// Lock a std mutex, recovering the data if a panicking test poisoned it.
pub(crate) fn lock<T>(m: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
