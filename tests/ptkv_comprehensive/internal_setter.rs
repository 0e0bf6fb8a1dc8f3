//! Internal Setter Tests
//!
//! Host-side seeding of predefined keys.

use crate::*;

#[test]
fn seeded_keys_visible_to_sql() {
    let conn = open_conn();
    let kv = ThreadLocalKv::init(&conn).unwrap();

    kv.set_internal(0, "root", "/data").unwrap();
    kv.set_internal(0, "depth", "3").unwrap();

    assert_eq!(sql_get(&conn, "root").unwrap(), "/data");
    assert_eq!(sql_get(&conn, "depth").unwrap(), "3");
}

#[test]
fn seed_replaces_existing_value() {
    let conn = open_conn();
    let kv = ThreadLocalKv::init(&conn).unwrap();

    sql_set(&conn, "mode", "fast").unwrap();
    kv.set_internal(1, "mode", "slow").unwrap();

    assert_eq!(sql_get(&conn, "mode").unwrap(), "slow");
    assert_eq!(rows_for(&conn, "mode"), 1);
}

#[test]
fn free_function_uses_default_store() {
    let conn = open_conn();
    ptkv::init(&conn).unwrap();

    ptkv::set_internal(5, &conn, "user", "o'brien").unwrap();
    assert_eq!(sql_get(&conn, "user").unwrap(), "o'brien");
}

#[test]
fn free_init_keeps_store_until_free_teardown() {
    let conn = open_conn();
    ptkv::init(&conn).unwrap();

    ptkv::set_internal(0, &conn, "mode", "fast").unwrap();
    sql_set(&conn, "depth", "3").unwrap();
    assert_eq!(sql_get(&conn, "mode").unwrap(), "fast");
    assert!(temp_table_exists(&conn, "PER_THREAD_KV"));

    ptkv::teardown(&conn);
    assert!(!temp_table_exists(&conn, "PER_THREAD_KV"));
    assert!(sql_get(&conn, "mode").is_err());
    assert!(ptkv::set_internal(0, &conn, "mode", "slow").is_err());
}

#[test]
fn failure_reports_thread_and_key() {
    let conn = open_conn();
    let kv = ThreadLocalKv::init(&conn).unwrap();
    conn.execute_batch("DROP TABLE temp.PER_THREAD_KV;").unwrap();

    let err = kv.set_internal(7, "mode", "fast").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("\"mode\""), "{msg}");
    assert!(msg.contains("thread 7"), "{msg}");
    assert!(msg.contains("no such table"), "{msg}");
    assert!(err.engine_error().is_some());
}

#[test]
fn free_function_without_store_fails() {
    let conn = open_conn();

    let err = ptkv::set_internal(2, &conn, "mode", "fast").unwrap_err();
    assert!(matches!(err, Error::Seed { thread_id: 2, .. }));
}

#[test]
fn empty_key_rejected_with_context() {
    let conn = open_conn();
    let kv = ThreadLocalKv::init(&conn).unwrap();

    let err = kv.set_internal(3, "", "x").unwrap_err();
    assert!(err.is_invalid_input());
    assert!(kv.is_empty().unwrap());
}

#[test]
fn bulk_seed() {
    let conn = open_conn();
    let kv = ThreadLocalKv::init(&conn).unwrap();

    let predefined = vec![
        ("root".to_string(), "/data".to_string()),
        ("user".to_string(), "alice".to_string()),
        ("mode".to_string(), "fast".to_string()),
    ];
    let pairs = predefined.iter().map(|(k, v)| (k.as_str(), v.as_str()));
    assert_eq!(kv.seed(0, pairs).unwrap(), 3);

    let entries = kv.entries().unwrap();
    assert_eq!(
        entries,
        vec![
            Entry::new("mode", "fast"),
            Entry::new("root", "/data"),
            Entry::new("user", "alice"),
        ]
    );
}
