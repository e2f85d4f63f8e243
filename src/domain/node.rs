//! Outline Node
//!
//! The nested node shape used for persistence, import/export and seeding.
//! Inside an outline nodes are held by the arena forest (`tree::Forest`);
//! this type is what goes in and comes out of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::NodeId;

/// A single outline entry with its owned subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineNode {
    /// Unique identifier, immutable after creation
    pub id: NodeId,
    /// Short display string
    pub title: String,
    /// Long-form text, may be empty
    #[serde(default)]
    pub content: String,
    /// Owning node (None = root of its outline)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    /// Ordered child subtrees
    #[serde(default)]
    pub children: Vec<OutlineNode>,
    /// Depth, 0 for roots
    #[serde(default)]
    pub level: u32,
    /// Position among siblings
    #[serde(default)]
    pub sort_order: i32,
    /// Whether children are shown in the UI
    #[serde(default = "default_true")]
    pub is_expanded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl OutlineNode {
    /// Create a new root node with a fresh id
    pub fn new(title: impl Into<String>) -> Self {
        Self::new_child(title, None, 0, 0)
    }

    /// Create a new node under a parent
    pub fn new_child(
        title: impl Into<String>,
        parent_id: Option<NodeId>,
        level: u32,
        sort_order: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: NodeId::new(),
            title: title.into(),
            content: String::new(),
            parent_id,
            children: Vec::new(),
            level,
            sort_order,
            is_expanded: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_children(mut self, children: Vec<OutlineNode>) -> Self {
        self.children = children;
        self
    }

    /// Check if this is a root node (no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Field changes for `update_node`.
///
/// Structural fields (parent, level, order) change only through moves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_expanded: Option<bool>,
}

impl NodePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn expanded(is_expanded: bool) -> Self {
        Self {
            is_expanded: Some(is_expanded),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.is_expanded.is_none()
    }
}
