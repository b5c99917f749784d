//! Scenario: aggregate invariants hold for arbitrary catalogs.
//!
//! # Invariants under test
//! - `out_of_stock_products + in_stock_products == total_products`
//! - zero products never yields `all_out_of_stock`
//! - `all_out_of_stock` iff every product's summed quantity is `<= 0`
//!
//! Pure in-process; no IO.

use proptest::prelude::*;
use sw_stock::{aggregate, decide, AlertKind, Product, StockState, Variant};

fn variant_strategy() -> impl Strategy<Value = Variant> {
    prop_oneof![
        Just(Variant::untracked()),
        (-50i64..50).prop_map(Variant::with_quantity),
    ]
}

fn product_strategy() -> impl Strategy<Value = Product> {
    prop::collection::vec(variant_strategy(), 0..6).prop_map(|v| Product::new("p", v))
}

fn state_strategy() -> impl Strategy<Value = Option<StockState>> {
    prop_oneof![
        Just(None),
        Just(Some(StockState::InStock)),
        Just(Some(StockState::OutOfStock)),
    ]
}

proptest! {
    #[test]
    fn counts_always_partition_total(products in prop::collection::vec(product_strategy(), 0..20)) {
        let snap = aggregate("Acme", &products);
        prop_assert_eq!(snap.out_of_stock_products + snap.in_stock_products, snap.total_products);
        prop_assert_eq!(snap.total_products, products.len());
    }

    #[test]
    fn all_out_of_stock_matches_definition(products in prop::collection::vec(product_strategy(), 0..20)) {
        let snap = aggregate("Acme", &products);
        let expected = !products.is_empty() && products.iter().all(|p| p.total_quantity() <= 0);
        prop_assert_eq!(snap.all_out_of_stock, expected);
    }

    #[test]
    fn no_two_identical_alerts_in_a_row(
        start in state_strategy(),
        catalogs in prop::collection::vec(prop::collection::vec(product_strategy(), 0..5), 1..12),
    ) {
        let mut state = start;
        let mut last_alert = None;
        for products in &catalogs {
            let snap = aggregate("Acme", products);
            let d = decide(state, &snap);
            if let Some(kind) = d.alert {
                prop_assert_ne!(Some(kind), last_alert);
                last_alert = Some(kind);
            }
            state = Some(d.next);
        }
    }
}

#[test]
fn zero_products_never_depleted() {
    let snap = aggregate("Nobody", &[]);
    assert!(!snap.all_out_of_stock);
    assert_eq!(decide(None, &snap).alert, None);
}

#[test]
fn acme_reference_catalog() {
    let products = vec![
        Product::new("a", vec![Variant::with_quantity(0)]),
        Product::new("b", vec![Variant::with_quantity(-2)]),
        Product::new("c", vec![Variant::with_quantity(5)]),
    ];
    let snap = aggregate("Acme", &products);
    assert_eq!(snap.total_products, 3);
    assert_eq!(snap.out_of_stock_products, 2);
    assert_eq!(snap.in_stock_products, 1);
    assert!(!snap.all_out_of_stock);
}

#[test]
fn depletion_then_restock_cycle() {
    let empty = vec![Product::new("a", vec![Variant::with_quantity(0)])];
    let stocked = vec![Product::new("a", vec![Variant::with_quantity(4)])];

    let d1 = decide(None, &aggregate("Acme", &stocked));
    assert_eq!(d1.alert, None);

    let d2 = decide(Some(d1.next), &aggregate("Acme", &empty));
    assert_eq!(d2.alert, Some(AlertKind::Depleted));

    let d3 = decide(Some(d2.next), &aggregate("Acme", &empty));
    assert_eq!(d3.alert, None);

    let d4 = decide(Some(d3.next), &aggregate("Acme", &stocked));
    assert_eq!(d4.alert, Some(AlertKind::Restocked));
    assert_eq!(d4.next, StockState::InStock);
}
