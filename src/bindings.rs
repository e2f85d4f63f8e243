//! JavaScript bindings
//!
//! `OutlineApp` is the handle the popup and side panel scripts hold. Every
//! call returns a promise; results cross the boundary as plain JSON values.

use std::rc::Rc;
use std::sync::Arc;

use js_sys::Promise;
use serde::Serialize;
use tokio::sync::Mutex;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::config::StoreConfig;
use crate::domain::{DomainError, NodeId, NodePatch, OutlineId, OutlinePatch};
use crate::extract::{organize_outline, ExtractedItem};
use crate::repository::{ChromeStorageArea, StorageManager};
use crate::store::OutlineStore;
use outline_logger::{init_logger, LoggerConfig};

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn from_js<T: serde::de::DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_err(err: DomainError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct OutlineApp {
    store: Rc<Mutex<OutlineStore>>,
    storage: Arc<StorageManager<ChromeStorageArea>>,
}

impl OutlineApp {
    fn run<F, Fut>(&self, op: F) -> Promise
    where
        F: FnOnce(Rc<Mutex<OutlineStore>>) -> Fut,
        Fut: std::future::Future<Output = Result<JsValue, JsValue>> + 'static,
    {
        future_to_promise(op(self.store.clone()))
    }
}

#[wasm_bindgen]
impl OutlineApp {
    /// `config` is a `StoreConfig` object; missing fields take defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<OutlineApp, JsValue> {
        let config: StoreConfig = from_js(config)?;
        let storage = Arc::new(
            StorageManager::with_config(ChromeStorageArea, &config).map_err(js_err)?,
        );
        let store = OutlineStore::new(storage.clone()).with_config(config);
        Ok(OutlineApp {
            store: Rc::new(Mutex::new(store)),
            storage,
        })
    }

    #[wasm_bindgen(js_name = initLogging)]
    pub fn init_logging(config: JsValue) -> Result<(), JsValue> {
        let config: LoggerConfig = from_js(config)?;
        init_logger(&config).map_err(|e| JsValue::from_str(&e))
    }

    /// Resolves to whether storage could be read
    pub fn load(&self) -> Promise {
        self.run(|store| async move {
            let loaded = store.lock().await.load_data().await;
            Ok(JsValue::from_bool(loaded))
        })
    }

    pub fn snapshot(&self) -> Promise {
        self.run(|store| async move { to_js(&store.lock().await.snapshot()) })
    }

    #[wasm_bindgen(js_name = createOutline)]
    pub fn create_outline(&self, title: String, description: Option<String>) -> Promise {
        self.run(|store| async move {
            let id = store.lock().await.create_outline(title, description).await;
            to_js(&id)
        })
    }

    #[wasm_bindgen(js_name = updateOutline)]
    pub fn update_outline(&self, id: String, patch: JsValue) -> Promise {
        self.run(|store| async move {
            let patch: OutlinePatch = from_js(patch)?;
            store
                .lock()
                .await
                .update_outline(&OutlineId::from(id), &patch)
                .await
                .map_err(js_err)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = deleteOutline)]
    pub fn delete_outline(&self, id: String) -> Promise {
        self.run(|store| async move {
            store
                .lock()
                .await
                .delete_outline(&OutlineId::from(id))
                .await
                .map_err(js_err)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = setCurrentOutline)]
    pub fn set_current_outline(&self, id: Option<String>) -> Promise {
        self.run(|store| async move {
            store
                .lock()
                .await
                .set_current_outline(id.map(OutlineId::from))
                .map_err(js_err)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Resolves to the new node id
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&self, parent_id: Option<String>, title: Option<String>) -> Promise {
        self.run(|store| async move {
            let parent = parent_id.map(NodeId::from);
            let id = store
                .lock()
                .await
                .add_node(parent.as_ref(), title)
                .await
                .map_err(js_err)?;
            to_js(&id)
        })
    }

    #[wasm_bindgen(js_name = updateNode)]
    pub fn update_node(&self, id: String, patch: JsValue) -> Promise {
        self.run(|store| async move {
            let patch: NodePatch = from_js(patch)?;
            store
                .lock()
                .await
                .update_node(&NodeId::from(id), &patch)
                .await
                .map_err(js_err)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Resolves to the ids of every removed node
    #[wasm_bindgen(js_name = deleteNode)]
    pub fn delete_node(&self, id: String) -> Promise {
        self.run(|store| async move {
            let removed = store
                .lock()
                .await
                .delete_node(&NodeId::from(id))
                .await
                .map_err(js_err)?;
            to_js(&removed)
        })
    }

    #[wasm_bindgen(js_name = moveNode)]
    pub fn move_node(
        &self,
        id: String,
        new_parent_id: Option<String>,
        new_index: Option<u32>,
    ) -> Promise {
        self.run(|store| async move {
            let parent = new_parent_id.map(NodeId::from);
            store
                .lock()
                .await
                .move_node(
                    &NodeId::from(id),
                    parent.as_ref(),
                    new_index.map(|i| i as usize),
                )
                .await
                .map_err(js_err)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Resolves to the new expansion state
    #[wasm_bindgen(js_name = toggleNodeExpansion)]
    pub fn toggle_node_expansion(&self, id: String) -> Promise {
        self.run(|store| async move {
            let expanded = store
                .lock()
                .await
                .toggle_node_expansion(&NodeId::from(id))
                .await
                .map_err(js_err)?;
            Ok(JsValue::from_bool(expanded))
        })
    }

    #[wasm_bindgen(js_name = setSelectedNode)]
    pub fn set_selected_node(&self, id: Option<String>) -> Promise {
        self.run(|store| async move {
            store
                .lock()
                .await
                .set_selected_node(id.map(NodeId::from))
                .map_err(js_err)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = setSearchQuery)]
    pub fn set_search_query(&self, query: String) -> Promise {
        self.run(|store| async move {
            let mut store = store.lock().await;
            store.set_search_query(query);
            let matches: Vec<NodeId> = store
                .search_results()
                .into_iter()
                .map(|node| node.id.clone())
                .collect();
            to_js(&matches)
        })
    }

    /// Seed an outline from flat content-script items (`{title, level, ...}`)
    #[wasm_bindgen(js_name = importExtraction)]
    pub fn import_extraction(&self, title: String, items: JsValue) -> Promise {
        self.run(|store| async move {
            let items: Vec<ExtractedItem> = from_js(items)?;
            let id = store
                .lock()
                .await
                .create_outline_from_extraction(title, organize_outline(items))
                .await
                .map_err(js_err)?;
            to_js(&id)
        })
    }

    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> Promise {
        self.run(|store| async move {
            let json = store.lock().await.export_json().map_err(js_err)?;
            Ok(JsValue::from_str(&json))
        })
    }

    /// Resolves to the number of imported outlines
    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&self, json: String) -> Promise {
        self.run(|store| async move {
            let count = store.lock().await.import_json(&json).await.map_err(js_err)?;
            Ok(JsValue::from_f64(count as f64))
        })
    }

    /// Pretty JSON of every stored key, settings included
    #[wasm_bindgen(js_name = exportData)]
    pub fn export_data(&self) -> Promise {
        let storage = self.storage.clone();
        future_to_promise(async move {
            let json = storage.export_data().await.map_err(js_err)?;
            Ok(JsValue::from_str(&json))
        })
    }

    /// Overwrite stored keys from an `exportData` document, then reload.
    /// Resolves to whether the reload succeeded.
    #[wasm_bindgen(js_name = importData)]
    pub fn import_data(&self, json: String) -> Promise {
        let storage = self.storage.clone();
        self.run(|store| async move {
            storage.import_data(&json).await.map_err(js_err)?;
            let loaded = store.lock().await.load_data().await;
            Ok(JsValue::from_bool(loaded))
        })
    }

    /// Wipe the storage area and the in-memory outlines
    #[wasm_bindgen(js_name = clearAll)]
    pub fn clear_all(&self) -> Promise {
        let storage = self.storage.clone();
        self.run(|store| async move {
            storage.clear_all().await.map_err(js_err)?;
            let loaded = store.lock().await.load_data().await;
            Ok(JsValue::from_bool(loaded))
        })
    }
}
