use std::collections::BTreeMap;

use sw_stock::StockState;
use tokio::sync::RwLock;

use crate::{StateStore, StoreError};

/// Process-local state table. Lost on restart; every brand starts unknown.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    inner: RwLock<BTreeMap<String, StockState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded table, mainly for tests and restores.
    pub fn with_entries(entries: BTreeMap<String, StockState>) -> Self {
        Self {
            inner: RwLock::new(entries),
        }
    }
}

#[async_trait::async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, brand: &str) -> Result<Option<StockState>, StoreError> {
        Ok(self.inner.read().await.get(brand).copied())
    }

    async fn set(&self, brand: &str, state: StockState) -> Result<(), StoreError> {
        self.inner.write().await.insert(brand.to_string(), state);
        Ok(())
    }

    async fn entries(&self) -> Result<BTreeMap<String, StockState>, StoreError> {
        Ok(self.inner.read().await.clone())
    }
}
