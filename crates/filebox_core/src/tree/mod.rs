//! Pure helpers over the flat node map.
//!
//! # Responsibility
//! - Resolve sibling name collisions.
//! - Walk the tree: ordered children, breadcrumb path, subtrees, ancestry.
//! - Aggregate payload sizes for files, folders and the whole store.
//!
//! # Invariants
//! - Helpers never panic on dangling parents or cyclic data; they stop walking.
//! - Helpers never mutate except [`remove_subtree`].

mod naming;
mod size;
mod walk;

pub use naming::unique_name;
pub use size::{folder_size, node_size, used_bytes};
pub use walk::{children, is_descendant, path, remove_subtree, subtree_ids};
