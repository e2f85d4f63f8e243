//! In-memory key-value area for tests and hosts without browser storage.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::traits::KeyValueArea;
use crate::domain::DomainResult;

#[derive(Debug, Default)]
pub struct MemoryArea {
    items: Mutex<Map<String, Value>>,
}

impl MemoryArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Map<String, Value>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }
}

#[async_trait(?Send)]
impl KeyValueArea for MemoryArea {
    async fn get(&self, key: &str) -> DomainResult<Option<Value>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> DomainResult<()> {
        self.items.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn get_all(&self) -> DomainResult<Map<String, Value>> {
        Ok(self.items.lock().await.clone())
    }

    async fn set_all(&self, items: Map<String, Value>) -> DomainResult<()> {
        self.items.lock().await.extend(items);
        Ok(())
    }

    async fn clear(&self) -> DomainResult<()> {
        self.items.lock().await.clear();
        Ok(())
    }
}
