//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for outline persistence.
//! Futures are `?Send`: in the browser they wrap JS promises and stay on
//! the extension's single thread.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::{DomainResult, Outline};

/// A JSON key-value area such as `chrome.storage.local`
#[async_trait(?Send)]
pub trait KeyValueArea {
    /// Value stored under `key`, if any
    async fn get(&self, key: &str) -> DomainResult<Option<Value>>;

    /// Store `value` under `key`, replacing what was there
    async fn set(&self, key: &str, value: Value) -> DomainResult<()>;

    /// Every stored key
    async fn get_all(&self) -> DomainResult<Map<String, Value>>;

    /// Store several keys in one write; other keys are kept
    async fn set_all(&self, items: Map<String, Value>) -> DomainResult<()>;

    /// Remove every key
    async fn clear(&self) -> DomainResult<()>;
}

/// Durable home of the full outline collection.
///
/// Every save carries the complete collection, so a lost save is simply
/// superseded by the next one.
#[async_trait(?Send)]
pub trait OutlineRepository {
    /// Stored outlines; an empty collection when nothing was saved yet
    async fn load_outlines(&self) -> DomainResult<Vec<Outline>>;

    /// Replace the stored collection
    async fn save_outlines(&self, outlines: &[Outline]) -> DomainResult<()>;
}
