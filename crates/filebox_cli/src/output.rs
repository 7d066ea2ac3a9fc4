//! Plain-text rendering of listings.

use crate::error::CliError;
use filebox_core::{detect_file_kind, format_bytes, FileSystem, FsError, FsNode, KvStore};
use std::collections::HashSet;
use std::io::Write;

const SIZE_FRACTION_DIGITS: usize = 1;

/// One listing row: id, kind, size, creation date, name.
pub fn format_row(fs: &FileSystem<impl KvStore>, node: &FsNode) -> String {
    let size = fs.node_size(&node.id).unwrap_or_default();
    format!(
        "{:<43}  {:<12}  {:>10}  {}  {}",
        node.id,
        detect_file_kind(node).label(),
        format_bytes(size, SIZE_FRACTION_DIGITS),
        node.created_at.date(),
        node.name
    )
}

/// Breadcrumb string, e.g. `Root / Docs / Inner`.
pub fn format_path(path: &[&FsNode]) -> String {
    path.iter()
        .map(|node| node.name.as_str())
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Writes `folder_id` and its descendants as an indented outline.
pub fn write_tree(
    fs: &FileSystem<impl KvStore>,
    folder_id: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let root = fs
        .node(folder_id)
        .ok_or_else(|| FsError::NodeNotFound(folder_id.to_string()))?;
    writeln!(out, "{}/", root.name)?;
    let mut visited = HashSet::from([folder_id.to_string()]);
    write_children(fs, folder_id, 1, &mut visited, out)
}

fn write_children(
    fs: &FileSystem<impl KvStore>,
    folder_id: &str,
    depth: usize,
    visited: &mut HashSet<String>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    for node in fs.children(folder_id)? {
        let indent = "  ".repeat(depth);
        if node.is_folder() {
            writeln!(out, "{indent}{}/", node.name)?;
            if visited.insert(node.id.clone()) {
                write_children(fs, &node.id, depth + 1, visited, out)?;
            }
        } else {
            let size = node.file_size().unwrap_or_default();
            writeln!(
                out,
                "{indent}{} ({})",
                node.name,
                format_bytes(size, SIZE_FRACTION_DIGITS)
            )?;
        }
    }
    Ok(())
}
