//! Local key-value storage with a byte quota.
//!
//! # Responsibility
//! - Define the [`KvStore`] contract the file-system service persists through.
//! - Provide SQLite-backed and in-memory implementations.
//! - Enforce the storage quota on every write.
//!
//! # Invariants
//! - Sum of `key.len() + value.len()` (UTF-8 bytes) over all entries never
//!   exceeds the quota.
//! - A rejected write leaves the previous value in place.
//! - SQLite stores carry the current schema before they are handed out.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod open;
mod sqlite;

pub use memory::MemoryKvStore;
pub use open::{open_store, open_store_in_memory, SCHEMA_VERSION};
pub use sqlite::SqliteKvStore;

/// Default quota, matching the smallest common browser local storage budget.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// Write would push total usage over the quota.
    QuotaExceeded {
        key: String,
        requested_bytes: u64,
        available_bytes: u64,
    },
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl StoreError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded {
                key,
                requested_bytes,
                available_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: requested {requested_bytes} bytes, {available_bytes} available"
            ),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::QuotaExceeded { .. } => None,
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// String key-value storage with a fixed byte quota.
pub trait KvStore {
    /// Loads one value.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    /// Inserts or replaces one value, failing with `QuotaExceeded` when full.
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
    /// Deletes one value. Missing keys are not an error.
    fn remove(&mut self, key: &str) -> StoreResult<()>;
    /// Bytes currently used by all entries.
    fn usage_bytes(&self) -> StoreResult<u64>;
    /// Configured quota in bytes.
    fn quota_bytes(&self) -> u64;
}

/// Bytes one entry accounts for against the quota.
pub(crate) fn entry_cost(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}
