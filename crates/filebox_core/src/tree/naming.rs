//! Sibling name collision resolution.

use crate::model::node::FsMap;

/// Returns a name that is free among the children of `parent_id`.
///
/// The desired name is trimmed first. A free name is returned as is; a taken
/// one gets ` (2)`, ` (3)`, ... inserted before its extension, so
/// `file.txt` becomes `file (2).txt`. `self_id` is excluded from the sibling
/// set so a rename to the current name is not a collision. A blank input is
/// returned unchanged.
pub fn unique_name(
    nodes: &FsMap,
    parent_id: &str,
    desired_name: &str,
    self_id: Option<&str>,
) -> String {
    let trimmed = desired_name.trim();
    if trimmed.is_empty() {
        return desired_name.to_string();
    }

    let sibling_names = nodes
        .values()
        .filter(|node| node.parent_id.as_deref() == Some(parent_id))
        .filter(|node| Some(node.id.as_str()) != self_id)
        .map(|node| node.name.as_str())
        .collect::<Vec<_>>();
    let exists = |name: &str| sibling_names.iter().any(|sibling| *sibling == name);

    if !exists(trimmed) {
        return trimmed.to_string();
    }

    // A leading dot (".bashrc") is part of the name, not an extension.
    let (base, ext) = match trimmed.rfind('.') {
        Some(index) if index > 0 => trimmed.split_at(index),
        _ => (trimmed, ""),
    };

    let mut counter: u64 = 2;
    loop {
        let candidate = format!("{base} ({counter}){ext}");
        if !exists(candidate.as_str()) {
            return candidate;
        }
        counter += 1;
    }
}
