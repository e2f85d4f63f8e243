//! Storage Manager
//!
//! Outline persistence on top of any `KeyValueArea`, plus whole-area
//! export, import and reset used by the options page.

use async_trait::async_trait;
use serde_json::Value;

use super::traits::{KeyValueArea, OutlineRepository};
use crate::config::{StoreConfig, OUTLINES_KEY};
use crate::domain::{DomainError, DomainResult, Outline};
use crate::transfer;

pub struct StorageManager<A> {
    area: A,
    outlines_key: String,
}

impl<A: KeyValueArea> StorageManager<A> {
    pub fn new(area: A) -> Self {
        Self {
            area,
            outlines_key: OUTLINES_KEY.to_string(),
        }
    }

    /// Use the configured outlines key; rejects keys that would clobber
    /// other entries (see `StoreConfig::validate`)
    pub fn with_config(area: A, config: &StoreConfig) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self {
            area,
            outlines_key: config.outlines_key.clone(),
        })
    }

    pub fn area(&self) -> &A {
        &self.area
    }

    pub fn outlines_key(&self) -> &str {
        &self.outlines_key
    }

    /// Pretty JSON of every stored key
    pub async fn export_data(&self) -> DomainResult<String> {
        let items = self.area.get_all().await?;
        serde_json::to_string_pretty(&Value::Object(items))
            .map_err(|e| DomainError::Storage(format!("Failed to export data: {}", e)))
    }

    /// Write every key of a JSON object produced by `export_data`.
    ///
    /// Nothing is written unless the whole document is valid, including a
    /// readable outline collection under the outlines key.
    pub async fn import_data(&self, json: &str) -> DomainResult<()> {
        let value: Value = transfer::from_json_str(json)
            .map_err(|e| DomainError::MalformedImport(format!("Invalid JSON data: {}", e)))?;
        let Value::Object(items) = value else {
            return Err(DomainError::MalformedImport(
                "Expected a JSON object of storage keys".to_string(),
            ));
        };

        if let Some(outlines) = items.get(&self.outlines_key) {
            transfer::outlines_from_value(outlines.clone())?;
        }
        self.area.set_all(items).await
    }

    pub async fn clear_all(&self) -> DomainResult<()> {
        self.area.clear().await
    }
}

#[async_trait(?Send)]
impl<A: KeyValueArea> OutlineRepository for StorageManager<A> {
    async fn load_outlines(&self) -> DomainResult<Vec<Outline>> {
        match self.area.get(&self.outlines_key).await? {
            Some(value) => transfer::outlines_from_value(value).map_err(|e| {
                DomainError::Storage(format!("Stored outlines are unreadable: {}", e))
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn save_outlines(&self, outlines: &[Outline]) -> DomainResult<()> {
        let value = serde_json::to_value(outlines)
            .map_err(|e| DomainError::Storage(format!("Failed to serialize outlines: {}", e)))?;
        self.area.set(&self.outlines_key, value).await
    }
}
