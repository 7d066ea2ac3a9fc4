//! SQLite-backed key-value store.

use super::{entry_cost, KvStore, StoreError, StoreResult};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};

/// Key-value store persisted in one SQLite table.
///
/// Build through [`super::open_store`] so the schema exists.
pub struct SqliteKvStore {
    conn: Connection,
    quota_bytes: u64,
}

impl SqliteKvStore {
    pub(super) fn new(conn: Connection, quota_bytes: u64) -> Self {
        Self { conn, quota_bytes }
    }

    /// Underlying connection, for diagnostics.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        let other_usage: i64 = tx.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
             FROM kv_entries
             WHERE key != ?1;",
            [key],
            |row| row.get(0),
        )?;

        let requested_bytes = entry_cost(key, value);
        let available_bytes = self.quota_bytes.saturating_sub(other_usage.max(0) as u64);
        if requested_bytes > available_bytes {
            warn!(
                "event=store_set module=store status=error error_code=quota_exceeded requested_bytes={} available_bytes={}",
                requested_bytes, available_bytes
            );
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                requested_bytes,
                available_bytes,
            });
        }

        tx.execute(
            "INSERT INTO kv_entries (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE
             SET value = excluded.value,
                 updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn usage_bytes(&self) -> StoreResult<u64> {
        let usage: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
             FROM kv_entries;",
            [],
            |row| row.get(0),
        )?;
        Ok(usage.max(0) as u64)
    }

    fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }
}
