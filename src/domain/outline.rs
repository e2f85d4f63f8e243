//! Outline Aggregate
//!
//! A named forest of nodes plus metadata. Persisted as one unit with the
//! nodes nested; held in memory as an arena `Forest`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{DomainError, Entity};
use super::ids::OutlineId;
use super::node::OutlineNode;
use crate::tree::Forest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OutlineRecord", into = "OutlineRecord")]
pub struct Outline {
    pub id: OutlineId,
    pub title: String,
    pub description: Option<String>,
    forest: Forest,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Serialized shape: camelCase with nested `nodes`
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutlineRecord {
    id: OutlineId,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    nodes: Vec<OutlineNode>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OutlineRecord> for Outline {
    type Error = DomainError;

    fn try_from(record: OutlineRecord) -> Result<Self, Self::Error> {
        let forest = Forest::from_nodes(record.nodes)?;
        Ok(Self {
            id: record.id,
            title: record.title,
            description: record.description,
            forest,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl From<Outline> for OutlineRecord {
    fn from(outline: Outline) -> Self {
        Self {
            nodes: outline.forest.to_nodes(),
            id: outline.id,
            title: outline.title,
            description: outline.description,
            created_at: outline.created_at,
            updated_at: outline.updated_at,
        }
    }
}

impl Outline {
    /// Create an empty outline with a fresh id
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: OutlineId::new(),
            title: title.into(),
            description,
            forest: Forest::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Mutable forest access; callers refresh `updated_at` via `touch`
    pub(crate) fn forest_mut(&mut self) -> &mut Forest {
        &mut self.forest
    }

    /// Nested copy of the root trees
    pub fn nodes(&self) -> Vec<OutlineNode> {
        self.forest.to_nodes()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn apply_patch(&mut self, patch: &OutlinePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = if description.is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
        self.touch();
    }
}

impl Entity for Outline {
    type Id = OutlineId;

    fn id(&self) -> &OutlineId {
        &self.id
    }
}

/// Metadata changes for `update_outline`.
///
/// An empty `description` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutlinePatch {
    pub title: Option<String>,
    pub description: Option<String>,
}
