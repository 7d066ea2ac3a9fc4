//! Use-case services.
//!
//! # Responsibility
//! - Expose the file-system state manager over a key-value store.

pub mod content;
pub mod file_system;
