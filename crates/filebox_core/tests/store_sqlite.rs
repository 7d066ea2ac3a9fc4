use filebox_core::store::SCHEMA_VERSION;
use filebox_core::{open_store, open_store_in_memory, KvStore, StoreError};
use rusqlite::Connection;

#[test]
fn open_store_in_memory_stamps_schema_version() {
    let store = open_store_in_memory(1024).unwrap();

    assert_eq!(schema_version(store.connection()), SCHEMA_VERSION);
    assert_table_exists(store.connection(), "kv_entries");
    assert_eq!(store.quota_bytes(), 1024);
    assert_eq!(store.usage_bytes().unwrap(), 0);
}

#[test]
fn values_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filebox.sqlite3");

    let mut first = open_store(&path, 1024).unwrap();
    first.set("greeting", "hello").unwrap();
    drop(first);

    let second = open_store(&path, 1024).unwrap();
    assert_eq!(schema_version(second.connection()), SCHEMA_VERSION);
    assert_eq!(second.get("greeting").unwrap().as_deref(), Some("hello"));
    assert_eq!(second.usage_bytes().unwrap(), 13);
}

#[test]
fn set_replaces_existing_value() {
    let mut store = open_store_in_memory(1024).unwrap();
    store.set("k", "one").unwrap();
    store.set("k", "two!").unwrap();

    assert_eq!(store.get("k").unwrap().as_deref(), Some("two!"));
    assert_eq!(store.usage_bytes().unwrap(), 5);
}

#[test]
fn quota_counts_utf8_bytes_and_rejects_overflow() {
    let mut store = open_store_in_memory(8).unwrap();
    store.set("a", "1234").unwrap();
    // "é" is two bytes: 1 + 2 * 2 = 5 bytes, only 3 left.
    let err = store.set("b", "éé").unwrap_err();
    match err {
        StoreError::QuotaExceeded {
            key,
            requested_bytes,
            available_bytes,
        } => {
            assert_eq!(key, "b");
            assert_eq!(requested_bytes, 5);
            assert_eq!(available_bytes, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.get("b").unwrap(), None);
    assert_eq!(store.get("a").unwrap().as_deref(), Some("1234"));
}

#[test]
fn oversized_replacement_keeps_previous_value() {
    let mut store = open_store_in_memory(10).unwrap();
    store.set("k", "small").unwrap();

    let err = store.set("k", "far too large").unwrap_err();
    assert!(err.is_quota_exceeded());
    assert_eq!(store.get("k").unwrap().as_deref(), Some("small"));
}

#[test]
fn remove_frees_quota() {
    let mut store = open_store_in_memory(6).unwrap();
    store.set("a", "12345").unwrap();
    assert!(store.set("b", "1").is_err());

    store.remove("a").unwrap();
    store.remove("missing").unwrap();
    store.set("b", "1").unwrap();
    assert_eq!(store.usage_bytes().unwrap(), 2);
}

#[test]
fn opening_store_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_store(&path, 1024).err().unwrap();
    match err {
        StoreError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "expected table `{table_name}` to exist");
}
