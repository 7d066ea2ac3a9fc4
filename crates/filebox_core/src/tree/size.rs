//! Payload size aggregation.

use super::walk::subtree_ids;
use crate::model::node::{FsMap, FsNode};

/// Sums file sizes in the subtree under `folder_id`.
pub fn folder_size(nodes: &FsMap, folder_id: &str) -> u64 {
    subtree_ids(nodes, folder_id)
        .iter()
        .filter_map(|id| nodes.get(id))
        .filter_map(FsNode::file_size)
        .sum()
}

/// File size for files, subtree total for folders.
pub fn node_size(nodes: &FsMap, node: &FsNode) -> u64 {
    match node.file_size() {
        Some(size) => size,
        None => folder_size(nodes, &node.id),
    }
}

/// Sums all file sizes in the map.
pub fn used_bytes(nodes: &FsMap) -> u64 {
    nodes.values().filter_map(FsNode::file_size).sum()
}
