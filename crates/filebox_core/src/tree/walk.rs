//! Tree traversal over the flat map.

use crate::model::node::{FsMap, FsNode};
use std::collections::{HashMap, HashSet};

/// Lists direct children of `parent_id`: folders first, then by name.
///
/// Names compare case-insensitively; exact name and id break ties so the
/// order is total.
pub fn children<'a>(nodes: &'a FsMap, parent_id: &str) -> Vec<&'a FsNode> {
    let mut items = nodes
        .values()
        .filter(|node| node.parent_id.as_deref() == Some(parent_id))
        .collect::<Vec<_>>();
    items.sort_by(|a, b| {
        a.kind()
            .cmp(&b.kind())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
    items
}

/// Returns folders from the root down to `folder_id`.
///
/// Empty when `folder_id` is unknown or not a folder.
pub fn path<'a>(nodes: &'a FsMap, folder_id: &str) -> Vec<&'a FsNode> {
    let mut path = Vec::new();
    let mut visited = HashSet::new();
    let mut cursor = nodes.get(folder_id);

    while let Some(current) = cursor {
        if !current.is_folder() || !visited.insert(current.id.as_str()) {
            break;
        }
        path.push(current);
        cursor = current
            .parent_id
            .as_deref()
            .and_then(|parent_id| nodes.get(parent_id));
    }

    path.reverse();
    path
}

/// Returns `id` followed by all of its descendants (pre-order).
///
/// Empty when `id` is unknown.
pub fn subtree_ids(nodes: &FsMap, id: &str) -> Vec<String> {
    if !nodes.contains_key(id) {
        return Vec::new();
    }

    let mut index: HashMap<&str, Vec<&str>> = HashMap::new();
    for node in nodes.values() {
        if let Some(parent_id) = node.parent_id.as_deref() {
            index.entry(parent_id).or_default().push(node.id.as_str());
        }
    }

    let mut result = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        result.push(current.to_string());
        if let Some(child_ids) = index.get(current) {
            stack.extend(child_ids.iter().rev());
        }
    }
    result
}

/// Removes `id` and its whole subtree. Returns the number of removed nodes.
pub fn remove_subtree(nodes: &mut FsMap, id: &str) -> usize {
    let ids = subtree_ids(nodes, id);
    for target in &ids {
        nodes.remove(target);
    }
    ids.len()
}

/// Returns whether `candidate` lies inside the subtree rooted at `ancestor`.
///
/// A node counts as inside its own subtree.
pub fn is_descendant(nodes: &FsMap, candidate: &str, ancestor: &str) -> bool {
    let mut visited = HashSet::new();
    let mut cursor = Some(candidate);
    while let Some(current) = cursor {
        if current == ancestor {
            return true;
        }
        if !visited.insert(current) {
            return false;
        }
        cursor = nodes
            .get(current)
            .and_then(|node| node.parent_id.as_deref());
    }
    false
}
