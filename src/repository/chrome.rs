//! `chrome.storage.local` key-value area (wasm32 only)
//!
//! Uses the promise form of the storage API available in Manifest V3.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;

use super::traits::KeyValueArea;
use crate::domain::{DomainError, DomainResult};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = get)]
    async fn local_get(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = set)]
    async fn local_set(items: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = clear)]
    async fn local_clear() -> Result<JsValue, JsValue>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStorageArea;

fn js_error(context: &str, err: JsValue) -> DomainError {
    DomainError::Storage(format!("{}: {:?}", context, err))
}

fn to_js<T: Serialize>(value: &T) -> DomainResult<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| DomainError::Storage(e.to_string()))
}

fn from_js(value: JsValue) -> DomainResult<Map<String, Value>> {
    if value.is_undefined() || value.is_null() {
        return Ok(Map::new());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| DomainError::Storage(e.to_string()))
}

#[async_trait(?Send)]
impl KeyValueArea for ChromeStorageArea {
    async fn get(&self, key: &str) -> DomainResult<Option<Value>> {
        let result = local_get(JsValue::from_str(key))
            .await
            .map_err(|e| js_error("chrome.storage.local.get failed", e))?;
        Ok(from_js(result)?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> DomainResult<()> {
        let mut items = Map::new();
        items.insert(key.to_string(), value);
        self.set_all(items).await
    }

    async fn get_all(&self) -> DomainResult<Map<String, Value>> {
        let result = local_get(JsValue::NULL)
            .await
            .map_err(|e| js_error("chrome.storage.local.get failed", e))?;
        from_js(result)
    }

    async fn set_all(&self, items: Map<String, Value>) -> DomainResult<()> {
        local_set(to_js(&items)?)
            .await
            .map_err(|e| js_error("chrome.storage.local.set failed", e))?;
        Ok(())
    }

    async fn clear(&self) -> DomainResult<()> {
        local_clear()
            .await
            .map_err(|e| js_error("chrome.storage.local.clear failed", e))?;
        Ok(())
    }
}
