//! Application State Store
//!
//! `OutlineStore` owns every outline plus the selection and UI transients.
//! Each mutation applies a forest primitive, refreshes timestamps, then
//! saves the full collection through the injected repository.
//!
//! Mutations report unresolved ids as errors and change nothing in that
//! case. Persistence is best-effort: once a mutation returns `Ok` it is
//! applied in memory, and a failed save only shows up as a
//! [`StoreEvent::SaveFailed`] on the event sink.
//!
//! Two stores writing the same storage area (say the popup and the side
//! panel) are not coordinated: the last save wins.

use std::sync::Arc;

use serde::Serialize;

use crate::config::StoreConfig;
use crate::domain::{
    position_by_id, DomainError, DomainResult, NodeId, NodePatch, Outline, OutlineId,
    OutlineNode, OutlinePatch,
};
use crate::events::{EventSink, StoreEvent, TracingSink};
use crate::extract::{self, ExtractedItem};
use crate::repository::OutlineRepository;
use crate::transfer;
use crate::tree::{Forest, NodeRecord};

/// Snapshot of everything the presentation layer shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// All known outlines
    pub outlines: Vec<Outline>,
    /// Selected outline, always one of `outlines`
    pub current_outline_id: Option<OutlineId>,
    /// Selected node inside the current outline
    pub selected_node_id: Option<NodeId>,
    pub is_loading: bool,
    pub search_query: String,
}

pub struct OutlineStore {
    state: AppState,
    repository: Arc<dyn OutlineRepository>,
    events: Arc<dyn EventSink>,
    config: StoreConfig,
}

impl OutlineStore {
    pub fn new(repository: Arc<dyn OutlineRepository>) -> Self {
        Self {
            state: AppState::default(),
            repository,
            events: Arc::new(TracingSink),
            config: StoreConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    // ========================
    // Reads
    // ========================

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> AppState {
        self.state.clone()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn outline(&self, id: &OutlineId) -> Option<&Outline> {
        position_by_id(&self.state.outlines, id).map(|index| &self.state.outlines[index])
    }

    pub fn current_outline(&self) -> Option<&Outline> {
        self.state
            .current_outline_id
            .as_ref()
            .and_then(|id| self.outline(id))
    }

    pub fn selected_node(&self) -> Option<&NodeRecord> {
        let id = self.state.selected_node_id.as_ref()?;
        self.current_outline()?.forest().get(id)
    }

    /// Indented rows of the current outline, collapsed subtrees hidden
    pub fn visible_rows(&self) -> Vec<(&NodeRecord, usize)> {
        self.current_outline()
            .map(|outline| outline.forest().visible_rows())
            .unwrap_or_default()
    }

    /// Nodes of the current outline matching the search query
    pub fn search_results(&self) -> Vec<&NodeRecord> {
        self.current_outline()
            .map(|outline| outline.forest().search(&self.state.search_query))
            .unwrap_or_default()
    }

    fn outline_mut(&mut self, id: &OutlineId) -> DomainResult<&mut Outline> {
        let index = position_by_id(&self.state.outlines, id)
            .ok_or_else(|| DomainError::OutlineNotFound(id.clone()))?;
        Ok(&mut self.state.outlines[index])
    }

    fn current_outline_mut(&mut self) -> DomainResult<&mut Outline> {
        let id = self
            .state
            .current_outline_id
            .clone()
            .ok_or(DomainError::NoCurrentOutline)?;
        self.outline_mut(&id)
    }

    /// Apply `op` to the current outline's forest; bumps the outline's
    /// `updated_at` only when `op` succeeds
    fn mutate_current<T>(
        &mut self,
        op: impl FnOnce(&mut Forest) -> DomainResult<T>,
    ) -> DomainResult<T> {
        let outline = self.current_outline_mut()?;
        let result = op(outline.forest_mut())?;
        outline.touch();
        Ok(result)
    }

    // ========================
    // Outline operations
    // ========================

    /// Create an empty outline and select it
    pub async fn create_outline(
        &mut self,
        title: impl Into<String>,
        description: Option<String>,
    ) -> OutlineId {
        let outline = Outline::new(title, description);
        let id = outline.id.clone();
        tracing::debug!(outline = %id, "creating outline");

        self.state.outlines.push(outline);
        self.select_outline(Some(id.clone()));
        self.persist().await;
        id
    }

    /// Create an outline seeded from content-script output and select it.
    ///
    /// `items` are expected already nested (see `extract::organize_outline`).
    pub async fn create_outline_from_extraction(
        &mut self,
        title: impl Into<String>,
        items: Vec<ExtractedItem>,
    ) -> DomainResult<OutlineId> {
        let mut outline = Outline::new(title, None);
        for node in extract::into_outline_nodes(items) {
            outline.forest_mut().insert_node(node, None)?;
        }
        let id = outline.id.clone();
        tracing::debug!(outline = %id, nodes = outline.forest().len(), "outline extracted");

        self.state.outlines.push(outline);
        self.select_outline(Some(id.clone()));
        self.persist().await;
        Ok(id)
    }

    pub async fn update_outline(&mut self, id: &OutlineId, patch: &OutlinePatch) -> DomainResult<()> {
        self.outline_mut(id)?.apply_patch(patch);
        self.persist().await;
        Ok(())
    }

    /// Remove an outline; clears the selection if it was current
    pub async fn delete_outline(&mut self, id: &OutlineId) -> DomainResult<()> {
        let index = position_by_id(&self.state.outlines, id)
            .ok_or_else(|| DomainError::OutlineNotFound(id.clone()))?;
        self.state.outlines.remove(index);
        if self.state.current_outline_id.as_ref() == Some(id) {
            self.select_outline(None);
        }
        tracing::debug!(outline = %id, "outline deleted");
        self.persist().await;
        Ok(())
    }

    /// Change the current outline; the node selection is always cleared
    pub fn set_current_outline(&mut self, id: Option<OutlineId>) -> DomainResult<()> {
        if let Some(id) = &id {
            if self.outline(id).is_none() {
                return Err(DomainError::OutlineNotFound(id.clone()));
            }
        }
        self.select_outline(id);
        Ok(())
    }

    fn select_outline(&mut self, id: Option<OutlineId>) {
        self.state.current_outline_id = id;
        self.state.selected_node_id = None;
    }

    // ========================
    // Node operations
    // ========================

    /// Add a node under `parent_id` (None = root) and select it
    pub async fn add_node(
        &mut self,
        parent_id: Option<&NodeId>,
        title: Option<String>,
    ) -> DomainResult<NodeId> {
        let title = title.unwrap_or_else(|| self.config.default_node_title.clone());

        let node_id = self.mutate_current(|forest| {
            let level = forest.level_under(parent_id)?;
            let sort_order = forest.allocate_sort_order(parent_id)?;
            let node = OutlineNode::new_child(title, parent_id.cloned(), level, sort_order);
            let node_id = node.id.clone();
            forest.insert_node(node, parent_id)?;
            Ok(node_id)
        })?;
        tracing::debug!(node = %node_id, parent = ?parent_id.map(NodeId::as_str), "node added");

        self.state.selected_node_id = Some(node_id.clone());
        self.persist().await;
        Ok(node_id)
    }

    pub async fn update_node(&mut self, id: &NodeId, patch: &NodePatch) -> DomainResult<()> {
        self.mutate_current(|forest| forest.update_node(id, patch))?;
        self.persist().await;
        Ok(())
    }

    /// Delete a node and its subtree; returns every removed id
    pub async fn delete_node(&mut self, id: &NodeId) -> DomainResult<Vec<NodeId>> {
        let removed = self.mutate_current(|forest| forest.remove_node(id))?;
        if let Some(selected) = &self.state.selected_node_id {
            if removed.contains(selected) {
                self.state.selected_node_id = None;
            }
        }
        tracing::debug!(node = %id, removed = removed.len(), "node deleted");
        self.persist().await;
        Ok(removed)
    }

    /// Re-parent and/or reorder a node together with its subtree
    pub async fn move_node(
        &mut self,
        id: &NodeId,
        new_parent_id: Option<&NodeId>,
        new_index: Option<usize>,
    ) -> DomainResult<()> {
        self.mutate_current(|forest| forest.move_node(id, new_parent_id, new_index))?;
        tracing::debug!(node = %id, parent = ?new_parent_id.map(NodeId::as_str), ?new_index, "node moved");
        self.persist().await;
        Ok(())
    }

    /// Flip `is_expanded`; returns the new value
    pub async fn toggle_node_expansion(&mut self, id: &NodeId) -> DomainResult<bool> {
        let expanded = self.mutate_current(|forest| {
            let current = forest
                .get(id)
                .ok_or_else(|| DomainError::NodeNotFound(id.clone()))?
                .is_expanded;
            forest.update_node(id, &NodePatch::expanded(!current))?;
            Ok(!current)
        })?;
        self.persist().await;
        Ok(expanded)
    }

    // ========================
    // Selection & UI transients
    // ========================

    pub fn set_selected_node(&mut self, id: Option<NodeId>) -> DomainResult<()> {
        if let Some(node_id) = &id {
            let known = self
                .current_outline()
                .ok_or(DomainError::NoCurrentOutline)?
                .forest()
                .contains(node_id);
            if !known {
                return Err(DomainError::NodeNotFound(node_id.clone()));
            }
        }
        self.state.selected_node_id = id;
        Ok(())
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.state.search_query = query.into();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.state.is_loading = loading;
    }

    // ========================
    // Persistence
    // ========================

    /// Replace outlines with what the repository holds.
    ///
    /// Returns false when loading failed; the outlines are then left as
    /// they were and the failure goes to the event sink.
    pub async fn load_data(&mut self) -> bool {
        self.set_loading(true);
        let loaded = match self.repository.load_outlines().await {
            Ok(outlines) => {
                let count = outlines.len();
                self.state.outlines = outlines;
                self.drop_stale_selection();
                self.events.emit(StoreEvent::Loaded { outlines: count });
                true
            }
            Err(error) => {
                self.events.emit(StoreEvent::LoadFailed { error });
                false
            }
        };
        self.set_loading(false);
        loaded
    }

    /// Save the full collection. Returns false when the repository failed.
    pub async fn save_data(&self) -> bool {
        let outlines = &self.state.outlines;
        match self.repository.save_outlines(outlines).await {
            Ok(()) => {
                self.events.emit(StoreEvent::Saved {
                    outlines: outlines.len(),
                });
                true
            }
            Err(error) => {
                self.events.emit(StoreEvent::SaveFailed { error });
                false
            }
        }
    }

    async fn persist(&self) {
        if self.config.autosave {
            self.save_data().await;
        }
    }

    fn drop_stale_selection(&mut self) {
        let current_exists = self.current_outline().is_some();
        if !current_exists {
            self.select_outline(None);
            return;
        }
        if self.state.selected_node_id.is_some() && self.selected_node().is_none() {
            self.state.selected_node_id = None;
        }
    }

    // ========================
    // Import / export
    // ========================

    pub fn export_json(&self) -> DomainResult<String> {
        transfer::export_outlines(&self.state.outlines)
    }

    /// Replace all outlines with an export; malformed input changes nothing.
    /// Returns the number of imported outlines.
    pub async fn import_json(&mut self, json: &str) -> DomainResult<usize> {
        let outlines = transfer::parse_outlines(json)?;
        let count = outlines.len();
        self.state.outlines = outlines;
        self.select_outline(None);
        tracing::info!(outlines = count, "outlines imported");
        self.persist().await;
        Ok(count)
    }
}
