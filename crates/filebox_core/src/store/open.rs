//! Store bootstrap utilities.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas and create the `kv_entries` table before
//!   handing out a store.
//!
//! # Invariants
//! - `PRAGMA user_version` equals [`SCHEMA_VERSION`] on every handed-out store.
//! - A database stamped with a newer version is refused, never rewritten.

use super::{SqliteKvStore, StoreError, StoreResult};
use log::{error, info};
use rusqlite::Connection;
use std::cmp::Ordering;
use std::path::Path;
use std::time::{Duration, Instant};

/// Schema version stamped into `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

const KV_ENTRIES_SQL: &str = include_str!("kv_entries.sql");

/// Opens a SQLite-backed store file with the given quota.
///
/// # Side effects
/// - Creates the database file and the `kv_entries` table when missing.
/// - Emits `store_open` logging events with duration and status.
pub fn open_store(path: impl AsRef<Path>, quota_bytes: u64) -> StoreResult<SqliteKvStore> {
    let started_at = Instant::now();
    info!("event=store_open module=store status=start mode=file quota_bytes={quota_bytes}");

    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode=file duration_ms={} error_code=store_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    finish_open(conn, quota_bytes, "file", started_at)
}

/// Opens an in-memory SQLite-backed store with the given quota.
pub fn open_store_in_memory(quota_bytes: u64) -> StoreResult<SqliteKvStore> {
    let started_at = Instant::now();
    info!("event=store_open module=store status=start mode=memory quota_bytes={quota_bytes}");

    let conn = match Connection::open_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode=memory duration_ms={} error_code=store_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    finish_open(conn, quota_bytes, "memory", started_at)
}

fn finish_open(
    mut conn: Connection,
    quota_bytes: u64,
    mode: &str,
    started_at: Instant,
) -> StoreResult<SqliteKvStore> {
    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=store_open module=store status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(SqliteKvStore::new(conn, quota_bytes))
        }
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode={} duration_ms={} error_code=store_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> StoreResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    ensure_schema(conn)
}

fn ensure_schema(conn: &mut Connection) -> StoreResult<()> {
    let db_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    match db_version.cmp(&SCHEMA_VERSION) {
        Ordering::Equal => Ok(()),
        Ordering::Greater => Err(StoreError::UnsupportedSchemaVersion {
            db_version,
            latest_supported: SCHEMA_VERSION,
        }),
        Ordering::Less => {
            let tx = conn.transaction()?;
            tx.execute_batch(KV_ENTRIES_SQL)?;
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            tx.commit()?;
            info!(
                "event=store_schema module=store status=ok from_version={} to_version={}",
                db_version, SCHEMA_VERSION
            );
            Ok(())
        }
    }
}
