//! JSON file key-value area
//!
//! Keeps the whole area in one JSON object on disk. Used by native tools
//! and tests that want storage to survive the process.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::traits::KeyValueArea;
use crate::domain::{DomainError, DomainResult};
use crate::transfer;

pub struct FileArea {
    path: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FileArea {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_items(&self) -> DomainResult<Map<String, Value>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(DomainError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        transfer::from_json_slice(&bytes).map_err(|e| {
            DomainError::Storage(format!("Corrupt storage file {}: {}", self.path.display(), e))
        })
    }

    async fn write_items(&self, items: &Map<String, Value>) -> DomainResult<()> {
        let bytes = serde_json::to_vec_pretty(items)
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        tokio::fs::write(&self.path, bytes).await.map_err(|e| {
            DomainError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait(?Send)]
impl KeyValueArea for FileArea {
    async fn get(&self, key: &str) -> DomainResult<Option<Value>> {
        Ok(self.read_items().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> DomainResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_items().await?;
        items.insert(key.to_string(), value);
        self.write_items(&items).await
    }

    async fn get_all(&self) -> DomainResult<Map<String, Value>> {
        self.read_items().await
    }

    async fn set_all(&self, items: Map<String, Value>) -> DomainResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut stored = self.read_items().await?;
        stored.extend(items);
        self.write_items(&stored).await
    }

    async fn clear(&self) -> DomainResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write_items(&Map::new()).await
    }
}
