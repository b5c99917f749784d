//! sw-store
//!
//! Remembered per-brand notification state: the only persisted entity and
//! the sole source of idempotence across reconciliation passes.
//!
//! # Contract
//! - `get` returning `None` means "never observed".
//! - Entries are created on first observation and overwritten on change;
//!   they are never deleted.
//! - Stores do not serialize read-modify-write on their own. The reconciler
//!   holds a per-brand lock around get → decide → set.

mod file;
mod memory;

pub use file::JsonFileStateStore;
pub use memory::InMemoryStateStore;

use std::collections::BTreeMap;

use sw_stock::StockState;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("state store io error at {path}: {message}")]
    Io { path: String, message: String },
    #[error("state store file {path} is corrupt: {message}")]
    Corrupt { path: String, message: String },
}

/// Per-brand state table.
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, brand: &str) -> Result<Option<StockState>, StoreError>;

    async fn set(&self, brand: &str, state: StockState) -> Result<(), StoreError>;

    /// Every remembered brand, sorted by name.
    async fn entries(&self) -> Result<BTreeMap<String, StockState>, StoreError>;
}
