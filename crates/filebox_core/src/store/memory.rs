//! In-memory key-value store.

use super::{entry_cost, KvStore, StoreError, StoreResult};
use std::collections::HashMap;

/// `HashMap`-backed store with the same quota rule as the SQLite store.
#[derive(Debug, Default, Clone)]
pub struct MemoryKvStore {
    entries: HashMap<String, String>,
    quota_bytes: u64,
}

impl MemoryKvStore {
    pub fn new(quota_bytes: u64) -> Self {
        Self {
            entries: HashMap::new(),
            quota_bytes,
        }
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let other_usage = self
            .entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, stored)| entry_cost(existing, stored))
            .sum::<u64>();
        let requested_bytes = entry_cost(key, value);
        let available_bytes = self.quota_bytes.saturating_sub(other_usage);
        if requested_bytes > available_bytes {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                requested_bytes,
                available_bytes,
            });
        }

        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn usage_bytes(&self) -> StoreResult<u64> {
        Ok(self
            .entries
            .iter()
            .map(|(key, value)| entry_cost(key, value))
            .sum())
    }

    fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }
}
