use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use sw_catalog::{CatalogError, CatalogSource};
use sw_stock::Product;

use crate::lock;

type Scripted = Result<Vec<Product>, CatalogError>;

/// Catalog fake keyed by brand.
///
/// Unknown brands return an empty product list. Each brand's response can
/// be replaced between passes to walk a scenario forward.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    responses: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<HashMap<String, usize>>,
    latency: Mutex<Option<Duration>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_products(&self, brand: &str, products: Vec<Product>) {
        lock(&self.responses).insert(brand.to_string(), Ok(products));
    }

    pub fn set_error(&self, brand: &str, err: CatalogError) {
        lock(&self.responses).insert(brand.to_string(), Err(err));
    }

    /// Every fetch sleeps this long before answering.
    pub fn set_latency(&self, d: Duration) {
        *lock(&self.latency) = Some(d);
    }

    pub fn calls(&self, brand: &str) -> usize {
        lock(&self.calls).get(brand).copied().unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl CatalogSource for FakeCatalog {
    fn source_name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_all_products(&self, brand: &str) -> Result<Vec<Product>, CatalogError> {
        *lock(&self.calls).entry(brand.to_string()).or_insert(0) += 1;

        let latency = *lock(&self.latency);
        if let Some(d) = latency {
            tokio::time::sleep(d).await;
        }

        lock(&self.responses)
            .get(brand)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
