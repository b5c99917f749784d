use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sw_stock::StockState;
use tokio::sync::RwLock;
use tracing::info;

use crate::{StateStore, StoreError};

const SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    schema_version: i32,
    updated_at_utc: DateTime<Utc>,
    brands: BTreeMap<String, StockState>,
}

/// Durable state table: one JSON document, rewritten on every change.
///
/// Writes go to a sibling file with the extension replaced by `tmp`
/// (`brands.json` is staged as `brands.tmp`) and are renamed over `<path>`,
/// so a crash mid-write leaves the previous document intact.
#[derive(Debug)]
pub struct JsonFileStateStore {
    path: PathBuf,
    inner: RwLock<BTreeMap<String, StockState>>,
}

impl JsonFileStateStore {
    /// Open (or lazily create) the document at `path`. A missing file is an
    /// empty table; an unreadable or unparsable file is an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let brands = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let doc: StateFile =
                    serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })?;
                if doc.schema_version != SCHEMA_VERSION {
                    return Err(StoreError::Corrupt {
                        path: path.display().to_string(),
                        message: format!("unsupported schema_version {}", doc.schema_version),
                    });
                }
                doc.brands
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(io_err(&path, e)),
        };

        info!(path = %path.display(), brands = brands.len(), "state store opened");
        Ok(Self {
            path,
            inner: RwLock::new(brands),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, brands: &BTreeMap<String, StockState>) -> Result<(), StoreError> {
        let doc = StateFile {
            schema_version: SCHEMA_VERSION,
            updated_at_utc: Utc::now(),
            brands: brands.clone(),
        };
        let json = serde_json::to_string_pretty(&doc).map_err(|e| StoreError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| io_err(dir, e))?;
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, format!("{json}\n"))
            .await
            .map_err(|e| io_err(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_err(&self.path, e))
    }
}

fn io_err(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

#[async_trait::async_trait]
impl StateStore for JsonFileStateStore {
    async fn get(&self, brand: &str) -> Result<Option<StockState>, StoreError> {
        Ok(self.inner.read().await.get(brand).copied())
    }

    async fn set(&self, brand: &str, state: StockState) -> Result<(), StoreError> {
        // Hold the write guard across the file write so documents land in order.
        let mut guard = self.inner.write().await;
        let mut next = guard.clone();
        next.insert(brand.to_string(), state);
        self.persist(&next).await?;
        *guard = next;
        Ok(())
    }

    async fn entries(&self) -> Result<BTreeMap<String, StockState>, StoreError> {
        Ok(self.inner.read().await.clone())
    }
}
