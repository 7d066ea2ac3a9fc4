//! Core logic for filebox, a virtual file manager persisted in a local
//! key-value store.
//! This crate is the single source of truth for tree invariants.

pub mod config;
pub mod kind;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod tree;

pub use config::{ConfigError, ConfigOverrides, FileboxConfig};
pub use kind::{detect_file_kind, format_bytes, mime_from_name, FileKind};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::node::{
    initial_state, FsMap, FsNode, NodeBody, NodeId, NodeKind, DEFAULT_MIME_TYPE, ROOT_ID,
};
pub use service::content::DataUrlError;
pub use service::file_system::{
    DownloadedFile, FileSystem, FsError, StorageUsage, UploadFile, STORAGE_KEY,
};
pub use store::{
    open_store, open_store_in_memory, KvStore, MemoryKvStore, SqliteKvStore, StoreError,
    StoreResult, DEFAULT_QUOTA_BYTES,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
