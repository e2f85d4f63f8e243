//! Outline Forest
//!
//! Arena storage for the node trees of one outline: records live in a flat
//! table keyed by id, parent/children are id references. Every mutation
//! validates first and only then touches the table, so a call that returns
//! an error leaves the forest exactly as it was.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::domain::{DomainError, DomainResult, Entity, NodeId, NodePatch, OutlineNode};

/// A node as stored in the arena
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub title: String,
    pub content: String,
    pub parent_id: Option<NodeId>,
    /// Child ids in display order
    pub children: Vec<NodeId>,
    pub level: u32,
    pub sort_order: i32,
    pub is_expanded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NodeRecord {
    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }
}

impl Entity for NodeRecord {
    type Id = NodeId;

    fn id(&self) -> &NodeId {
        &self.id
    }
}

/// Ordered root trees of one outline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest {
    nodes: HashMap<NodeId, NodeRecord>,
    roots: Vec<NodeId>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a forest from nested nodes.
    ///
    /// Position is authoritative: `parent_id` and `level` are re-derived,
    /// siblings are ordered by `sort_order`, and sibling sets with clashing
    /// orders are re-indexed. Duplicate ids are rejected.
    pub fn from_nodes(nodes: Vec<OutlineNode>) -> DomainResult<Self> {
        let mut forest = Self::new();
        for node in nodes {
            forest.insert_node(node, None).map_err(|err| match err {
                DomainError::Conflict(msg) => DomainError::MalformedImport(msg),
                other => other,
            })?;
        }
        forest.repair_sort_orders();
        Ok(forest)
    }

    /// Nested copy of the whole forest
    pub fn to_nodes(&self) -> Vec<OutlineNode> {
        self.roots
            .iter()
            .filter_map(|id| self.build_node(id))
            .collect()
    }

    fn build_node(&self, id: &NodeId) -> Option<OutlineNode> {
        let record = self.nodes.get(id)?;
        Some(OutlineNode {
            id: record.id.clone(),
            title: record.title.clone(),
            content: record.content.clone(),
            parent_id: record.parent_id.clone(),
            children: record
                .children
                .iter()
                .filter_map(|child| self.build_node(child))
                .collect(),
            level: record.level,
            sort_order: record.sort_order,
            is_expanded: record.is_expanded,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Find a node anywhere in the forest
    pub fn get(&self, id: &NodeId) -> Option<&NodeRecord> {
        self.nodes.get(id)
    }

    pub fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    /// Child records of a parent (None = roots), in display order
    pub fn children(&self, parent: Option<&NodeId>) -> DomainResult<Vec<&NodeRecord>> {
        Ok(self
            .sibling_ids(parent)?
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect())
    }

    fn sibling_ids(&self, parent: Option<&NodeId>) -> DomainResult<&Vec<NodeId>> {
        match parent {
            Some(pid) => self
                .nodes
                .get(pid)
                .map(|node| &node.children)
                .ok_or_else(|| DomainError::ParentNotFound(pid.clone())),
            None => Ok(&self.roots),
        }
    }

    fn sibling_ids_mut(&mut self, parent: Option<&NodeId>) -> DomainResult<&mut Vec<NodeId>> {
        match parent {
            Some(pid) => self
                .nodes
                .get_mut(pid)
                .map(|node| &mut node.children)
                .ok_or_else(|| DomainError::ParentNotFound(pid.clone())),
            None => Ok(&mut self.roots),
        }
    }

    /// Next free sibling order under a parent (None = roots).
    ///
    /// 0 for an empty sibling set, otherwise max + 1. Fails with `Conflict`
    /// when the highest order is already `i32::MAX`.
    pub fn next_sort_order(&self, parent: Option<&NodeId>) -> DomainResult<i32> {
        match self.max_sort_order(parent)? {
            None => Ok(0),
            Some(max) => max.checked_add(1).ok_or_else(|| {
                DomainError::Conflict("Sibling sort order is exhausted".to_string())
            }),
        }
    }

    /// Next sibling order, re-indexing the sibling set 0..n first when its
    /// highest order has no successor
    pub fn allocate_sort_order(&mut self, parent: Option<&NodeId>) -> DomainResult<i32> {
        if self.max_sort_order(parent)? == Some(i32::MAX) {
            self.reindex_siblings(parent);
        }
        self.next_sort_order(parent)
    }

    fn max_sort_order(&self, parent: Option<&NodeId>) -> DomainResult<Option<i32>> {
        Ok(self
            .sibling_ids(parent)?
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|node| node.sort_order)
            .max())
    }

    /// Depth a child of `parent` gets
    pub fn level_under(&self, parent: Option<&NodeId>) -> DomainResult<u32> {
        match parent {
            Some(pid) => self
                .nodes
                .get(pid)
                .map(|node| node.level + 1)
                .ok_or_else(|| DomainError::ParentNotFound(pid.clone())),
            None => Ok(0),
        }
    }

    /// Insert `node` (with any nested children) under `parent`.
    ///
    /// `parent_id` and levels of the inserted subtree are set from the
    /// attachment point. `sort_order` is kept as given and decides the
    /// position: after every sibling with an order less than or equal to it.
    pub fn insert_node(&mut self, node: OutlineNode, parent: Option<&NodeId>) -> DomainResult<()> {
        let level = self.level_under(parent)?;

        let mut incoming = Vec::new();
        let root_id = flatten_subtree(node, parent.cloned(), level, &mut incoming);

        let mut seen = HashSet::new();
        for record in &incoming {
            if self.nodes.contains_key(&record.id) || !seen.insert(record.id.clone()) {
                return Err(DomainError::Conflict(format!(
                    "Node {} already exists",
                    record.id
                )));
            }
        }

        let sort_order = incoming[0].sort_order;
        let position = self
            .children(parent)?
            .iter()
            .take_while(|sibling| sibling.sort_order <= sort_order)
            .count();
        self.sibling_ids_mut(parent)?.insert(position, root_id);
        for record in incoming {
            self.nodes.insert(record.id.clone(), record);
        }
        Ok(())
    }

    /// Merge `patch` into one node and refresh its `updated_at`
    pub fn update_node(&mut self, id: &NodeId, patch: &NodePatch) -> DomainResult<()> {
        let record = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.clone()))?;

        if let Some(title) = &patch.title {
            record.title = title.clone();
        }
        if let Some(content) = &patch.content {
            record.content = content.clone();
        }
        if let Some(is_expanded) = patch.is_expanded {
            record.is_expanded = is_expanded;
        }
        record.updated_at = Utc::now();
        Ok(())
    }

    /// Remove a node together with its subtree.
    ///
    /// Returns the removed ids, the node itself first.
    pub fn remove_node(&mut self, id: &NodeId) -> DomainResult<Vec<NodeId>> {
        let parent_id = self
            .nodes
            .get(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.clone()))?
            .parent_id
            .clone();

        let mut removed = vec![id.clone()];
        removed.extend(self.descendants(id)?);

        if let Ok(siblings) = self.sibling_ids_mut(parent_id.as_ref()) {
            siblings.retain(|sibling| sibling != id);
        }
        for removed_id in &removed {
            self.nodes.remove(removed_id);
        }
        Ok(removed)
    }

    /// All descendants of a node in depth-first order (excluding the node)
    pub fn descendants(&self, id: &NodeId) -> DomainResult<Vec<NodeId>> {
        let root = self
            .nodes
            .get(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.clone()))?;

        let mut result = Vec::new();
        let mut to_visit: Vec<&NodeId> = root.children.iter().rev().collect();
        while let Some(current) = to_visit.pop() {
            if let Some(node) = self.nodes.get(current) {
                result.push(node.id.clone());
                to_visit.extend(node.children.iter().rev());
            }
        }
        Ok(result)
    }

    /// Re-parent and/or reorder a node, keeping its subtree intact.
    ///
    /// Without `new_index` the node is appended with the next sort order.
    /// With `new_index` (clamped to the sibling count, counted without the
    /// moved node) it is inserted there and the destination siblings are
    /// re-indexed 0..n.
    pub fn move_node(
        &mut self,
        id: &NodeId,
        new_parent: Option<&NodeId>,
        new_index: Option<usize>,
    ) -> DomainResult<()> {
        let old_parent = self
            .nodes
            .get(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.clone()))?
            .parent_id
            .clone();

        if let Some(pid) = new_parent {
            if pid == id {
                return Err(DomainError::InvalidMove(format!(
                    "Node {} cannot be its own parent",
                    id
                )));
            }
            if !self.nodes.contains_key(pid) {
                return Err(DomainError::ParentNotFound(pid.clone()));
            }
            if self.descendants(id)?.contains(pid) {
                return Err(DomainError::InvalidMove(format!(
                    "Node {} cannot move under its descendant {}",
                    id, pid
                )));
            }
        }

        let level = self.level_under(new_parent)?;
        let sort_order = self.allocate_sort_order(new_parent)?;

        if let Ok(siblings) = self.sibling_ids_mut(old_parent.as_ref()) {
            siblings.retain(|sibling| sibling != id);
        }
        let siblings = self.sibling_ids_mut(new_parent)?;
        match new_index {
            Some(index) => {
                let index = index.min(siblings.len());
                siblings.insert(index, id.clone());
            }
            None => siblings.push(id.clone()),
        }

        if let Some(record) = self.nodes.get_mut(id) {
            record.parent_id = new_parent.cloned();
            record.sort_order = sort_order;
            record.updated_at = Utc::now();
        }
        if new_index.is_some() {
            self.reindex_siblings(new_parent);
        }
        self.relevel_subtree(id, level);
        Ok(())
    }

    /// Number the siblings under `parent` 0, 1, 2, ... in display order
    fn reindex_siblings(&mut self, parent: Option<&NodeId>) {
        let ids = match self.sibling_ids(parent) {
            Ok(ids) => ids.clone(),
            Err(_) => return,
        };
        for (position, sibling) in ids.iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(sibling) {
                let position = position as i32;
                if node.sort_order != position {
                    node.sort_order = position;
                    node.updated_at = Utc::now();
                }
            }
        }
    }

    fn relevel_subtree(&mut self, id: &NodeId, level: u32) {
        let mut to_visit = vec![(id.clone(), level)];
        while let Some((current, level)) = to_visit.pop() {
            if let Some(node) = self.nodes.get_mut(&current) {
                node.level = level;
                to_visit.extend(node.children.iter().map(|child| (child.clone(), level + 1)));
            }
        }
    }

    fn repair_sort_orders(&mut self) {
        let mut parents: Vec<Option<NodeId>> = vec![None];
        parents.extend(self.nodes.keys().cloned().map(Some));

        for parent in parents {
            let clashes = match self.children(parent.as_ref()) {
                Ok(children) => children
                    .windows(2)
                    .any(|pair| pair[0].sort_order == pair[1].sort_order),
                Err(_) => false,
            };
            if clashes {
                self.reindex_siblings(parent.as_ref());
            }
        }
    }

    /// Depth-first walk over every node
    pub fn depth_first(&self) -> Vec<&NodeRecord> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut to_visit: Vec<&NodeId> = self.roots.iter().rev().collect();
        while let Some(current) = to_visit.pop() {
            if let Some(node) = self.nodes.get(current) {
                result.push(node);
                to_visit.extend(node.children.iter().rev());
            }
        }
        result
    }

    /// Rows for an indented tree view: (node, depth) pairs in display order,
    /// skipping the children of collapsed nodes
    pub fn visible_rows(&self) -> Vec<(&NodeRecord, usize)> {
        fn collect<'a>(
            forest: &'a Forest,
            ids: &'a [NodeId],
            depth: usize,
            result: &mut Vec<(&'a NodeRecord, usize)>,
        ) {
            for id in ids {
                if let Some(node) = forest.nodes.get(id) {
                    result.push((node, depth));
                    if node.is_expanded {
                        collect(forest, &node.children, depth + 1, result);
                    }
                }
            }
        }

        let mut result = Vec::new();
        collect(self, &self.roots, 0, &mut result);
        result
    }

    /// Nodes whose title or content contains `query`, case-insensitive.
    ///
    /// A blank query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&NodeRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.depth_first()
            .into_iter()
            .filter(|node| node.matches(&needle))
            .collect()
    }
}

/// Flatten a nested node into arena records (subtree root first).
/// Returns the subtree root id.
fn flatten_subtree(
    node: OutlineNode,
    parent_id: Option<NodeId>,
    level: u32,
    out: &mut Vec<NodeRecord>,
) -> NodeId {
    let OutlineNode {
        id,
        title,
        content,
        mut children,
        sort_order,
        is_expanded,
        created_at,
        updated_at,
        ..
    } = node;
    children.sort_by_key(|child| child.sort_order);

    let slot = out.len();
    out.push(NodeRecord {
        id: id.clone(),
        title,
        content,
        parent_id,
        children: Vec::new(),
        level,
        sort_order,
        is_expanded,
        created_at,
        updated_at,
    });

    let child_ids = children
        .into_iter()
        .map(|child| flatten_subtree(child, Some(id.clone()), level + 1, out))
        .collect();
    out[slot].children = child_ids;
    id
}
