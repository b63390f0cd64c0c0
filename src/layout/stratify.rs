//! Stratifier: flatten a display tree into a parent-indexed entry list.

use super::hierarchy::{DisplayId, DisplayTree, Level};

/// One flattened display node.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: DisplayId,
    /// Parent in the display tree (not a genealogical parent).
    pub parent_id: Option<DisplayId>,
    /// Index of the node in the display tree arena.
    pub node: usize,
    pub level: Level,
    pub position: usize,
    pub is_union: bool,
    /// Pre-order rank, the natural sibling order of the source tree.
    pub order: usize,
}

/// Pre-order traversal of the display tree.
///
/// The input is a tree by construction, so no loop detection is needed.
pub fn flatten(tree: &DisplayTree) -> Vec<Entry> {
    let mut entries = Vec::with_capacity(tree.len());
    if tree.is_empty() {
        return entries;
    }

    let mut stack: Vec<(usize, Option<usize>)> = vec![(tree.root_index(), None)];
    while let Some((index, parent)) = stack.pop() {
        let Some(node) = tree.node(index) else {
            continue;
        };
        let parent_id = parent.and_then(|p| tree.node(p)).map(|p| p.id.clone());
        entries.push(Entry {
            id: node.id.clone(),
            parent_id,
            node: index,
            level: node.level,
            position: node.position,
            is_union: node.is_union(),
            order: entries.len(),
        });

        // Reverse so the first child is popped first
        for &child in node.children.iter().rev() {
            stack.push((child, Some(index)));
        }
    }

    entries
}
