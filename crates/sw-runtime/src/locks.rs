use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per brand, created on first use and kept for the
/// process lifetime (the brand set is fixed by configuration).
#[derive(Debug, Default)]
pub(crate) struct BrandLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl BrandLocks {
    pub(crate) async fn lock(&self, brand: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().await;
            Arc::clone(map.entry(brand.to_string()).or_default())
        };
        slot.lock_owned().await
    }
}
