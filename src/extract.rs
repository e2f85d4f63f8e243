//! Extraction Output
//!
//! Shapes what the content script scrapes from a board into outline nodes.
//! Locating elements on the page is the content script's business; this
//! module only nests level-tagged items and converts them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{NodeId, OutlineNode};

/// Titles longer than this many characters are cut and suffixed with `...`
pub const TITLE_MAX_CHARS: usize = 50;

/// One scraped entry; `level` is the heading level, not the tree depth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedItem {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub level: u32,
    #[serde(default)]
    pub children: Vec<ExtractedItem>,
}

impl ExtractedItem {
    /// Build an item from raw element text; blank text yields nothing
    pub fn from_text(text: &str, level: u32) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4().simple().to_string(),
            title: truncate_title(text),
            content: text.to_string(),
            level,
            children: Vec::new(),
        })
    }
}

pub fn truncate_title(text: &str) -> String {
    if text.chars().count() > TITLE_MAX_CHARS {
        let head: String = text.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Nest a flat, document-ordered list by heading level.
///
/// Each item becomes a child of the closest preceding item with a lower
/// level; items with no such predecessor become roots.
pub fn organize_outline(items: Vec<ExtractedItem>) -> Vec<ExtractedItem> {
    fn attach(
        done: ExtractedItem,
        stack: &mut [ExtractedItem],
        organized: &mut Vec<ExtractedItem>,
    ) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(done),
            None => organized.push(done),
        }
    }

    let mut organized = Vec::new();
    let mut stack: Vec<ExtractedItem> = Vec::new();

    for item in items {
        while stack.last().is_some_and(|top| top.level >= item.level) {
            if let Some(done) = stack.pop() {
                attach(done, &mut stack, &mut organized);
            }
        }
        stack.push(item);
    }
    while let Some(done) = stack.pop() {
        attach(done, &mut stack, &mut organized);
    }
    organized
}

/// Convert extracted trees into fresh outline nodes.
///
/// Ids are regenerated; levels follow tree depth and sort orders follow
/// document order.
pub fn into_outline_nodes(items: Vec<ExtractedItem>) -> Vec<OutlineNode> {
    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| to_node(item, None, 0, position as i32))
        .collect()
}

fn to_node(
    item: ExtractedItem,
    parent_id: Option<NodeId>,
    level: u32,
    sort_order: i32,
) -> OutlineNode {
    let node = OutlineNode::new_child(item.title, parent_id, level, sort_order)
        .with_content(item.content);
    let id = node.id.clone();
    let children = item
        .children
        .into_iter()
        .enumerate()
        .map(|(position, child)| to_node(child, Some(id.clone()), level + 1, position as i32))
        .collect();
    node.with_children(children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, level: u32) -> ExtractedItem {
        ExtractedItem {
            id: title.to_string(),
            title: title.to_string(),
            content: String::new(),
            level,
            children: Vec::new(),
        }
    }

    fn titles(items: &[ExtractedItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_from_text_truncates_long_titles() {
        let long = "x".repeat(80);
        let item = ExtractedItem::from_text(&format!("  {}  ", long), 2).unwrap();
        assert_eq!(item.title.chars().count(), TITLE_MAX_CHARS + 3);
        assert!(item.title.ends_with("..."));
        assert_eq!(item.content, long);
        assert_eq!(item.level, 2);
    }

    #[test]
    fn test_from_text_rejects_blank() {
        assert!(ExtractedItem::from_text("   \n", 1).is_none());
    }

    #[test]
    fn test_truncate_counts_characters() {
        let text = "é".repeat(TITLE_MAX_CHARS);
        assert_eq!(truncate_title(&text), text);
    }

    #[test]
    fn test_organize_nests_by_level() {
        let flat = vec![
            item("Intro", 1),
            item("Scope", 2),
            item("Detail", 3),
            item("Goals", 2),
            item("Body", 1),
        ];

        let tree = organize_outline(flat);

        assert_eq!(titles(&tree), vec!["Intro", "Body"]);
        assert_eq!(titles(&tree[0].children), vec!["Scope", "Goals"]);
        assert_eq!(titles(&tree[0].children[0].children), vec!["Detail"]);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_organize_starting_deep() {
        let tree = organize_outline(vec![item("Deep", 3), item("Top", 1), item("Sub", 2)]);
        assert_eq!(titles(&tree), vec!["Deep", "Top"]);
        assert_eq!(titles(&tree[1].children), vec!["Sub"]);
    }

    #[test]
    fn test_into_outline_nodes() {
        let tree = organize_outline(vec![item("A", 1), item("A1", 2), item("A2", 2), item("B", 1)]);

        let nodes = into_outline_nodes(tree);

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].sort_order, 1);
        let a = &nodes[0];
        assert_ne!(a.id.as_str(), "A");
        assert_eq!(a.children.len(), 2);
        assert_eq!(a.children[1].title, "A2");
        assert_eq!(a.children[1].level, 1);
        assert_eq!(a.children[1].sort_order, 1);
        assert_eq!(a.children[1].parent_id.as_ref(), Some(&a.id));
    }
}
