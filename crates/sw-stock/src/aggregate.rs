use crate::{BrandStockSnapshot, Product};

/// Reduce a brand's product list to one snapshot.
///
/// A brand with zero products is never `all_out_of_stock`: an empty or
/// unknown brand must not raise a depletion alarm.
pub fn aggregate(brand: &str, products: &[Product]) -> BrandStockSnapshot {
    let total_products = products.len();
    let out_of_stock_products = products.iter().filter(|p| p.is_out_of_stock()).count();
    let in_stock_products = total_products - out_of_stock_products;

    BrandStockSnapshot {
        brand: brand.to_string(),
        total_products,
        out_of_stock_products,
        in_stock_products,
        all_out_of_stock: total_products > 0 && out_of_stock_products == total_products,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Variant;

    fn product(qtys: &[i64]) -> Product {
        Product::new(
            "p",
            qtys.iter().copied().map(Variant::with_quantity).collect(),
        )
    }

    #[test]
    fn mixed_brand_counts() {
        let products = vec![product(&[0]), product(&[-2]), product(&[5])];
        let snap = aggregate("Acme", &products);
        assert_eq!(snap.brand, "Acme");
        assert_eq!(snap.total_products, 3);
        assert_eq!(snap.out_of_stock_products, 2);
        assert_eq!(snap.in_stock_products, 1);
        assert!(!snap.all_out_of_stock);
    }

    #[test]
    fn empty_brand_is_not_depleted() {
        let snap = aggregate("Ghost", &[]);
        assert_eq!(snap.total_products, 0);
        assert!(!snap.all_out_of_stock);
    }

    #[test]
    fn fully_depleted_brand() {
        let products = vec![product(&[0, 0]), product(&[-1, 1]), product(&[])];
        let snap = aggregate("Acme", &products);
        assert_eq!(snap.out_of_stock_products, 3);
        assert_eq!(snap.in_stock_products, 0);
        assert!(snap.all_out_of_stock);
    }
}
