//! Domain model for the virtual file tree.
//!
//! # Responsibility
//! - Define the node record persisted in the key-value store.
//! - Keep the persisted JSON shape stable across releases.

pub mod node;
