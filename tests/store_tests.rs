use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use yazr::{DiskStore, Store};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn test_disk_store_basic_operations() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("cache");
    let store = DiskStore::new(&dir).unwrap();
    assert_eq!(store.dir(), dir);

    let key = "test_key".to_string();
    let value = json!({"answer": 42});

    // Test initial state
    assert!(store.get(&key, true).unwrap().is_none());

    // Test set and get
    store.set(&key, value.clone(), None, None, true).unwrap();
    assert_eq!(store.get(&key, true).unwrap(), Some(value.clone()));

    // Test stats
    let stats = store.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entry_count, 1);

    // Test remove
    assert!(store.remove(&key).unwrap());
    assert!(!store.remove(&key).unwrap());
    assert!(store.get(&key, true).unwrap().is_none());

    // Test clear
    store.set(&key, value, None, None, true).unwrap();
    assert_eq!(store.clear().unwrap(), 1);
    assert!(store.get(&key, true).unwrap().is_none());
    assert_eq!(store.stats().entry_count, 0);
}

#[test]
fn test_disk_store_expiry() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let store = DiskStore::new(temp.path().join("cache")).unwrap();

    let key = "expiring".to_string();
    store
        .set(&key, json!(1), Some(Duration::from_millis(100)), None, true)
        .unwrap();
    assert_eq!(store.get(&key, true).unwrap(), Some(json!(1)));

    // Wait for the entry to expire
    std::thread::sleep(Duration::from_millis(150));
    assert!(store.get(&key, true).unwrap().is_none());
    assert_eq!(store.stats().entry_count, 0);
}

#[test]
fn test_entries_persist_across_instances() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("cache");

    let key = "persistent".to_string();
    {
        let store = DiskStore::new(&dir).unwrap();
        store.set(&key, json!("kept"), None, None, true).unwrap();
    }

    let reopened = DiskStore::new(&dir).unwrap();
    assert_eq!(reopened.get(&key, true).unwrap(), Some(json!("kept")));
}

#[test]
fn test_evict_tag_removes_only_tagged_entries() {
    let temp = TempDir::new().unwrap();
    let store = DiskStore::new(temp.path().join("cache")).unwrap();

    store
        .set(&"a".to_string(), json!(1), None, Some("fib"), true)
        .unwrap();
    store
        .set(&"b".to_string(), json!(2), None, Some("fib"), true)
        .unwrap();
    store
        .set(&"c".to_string(), json!(3), None, None, true)
        .unwrap();

    assert_eq!(store.evict_tag("fib").unwrap(), 2);
    assert!(store.get(&"a".to_string(), true).unwrap().is_none());
    assert!(store.get(&"b".to_string(), true).unwrap().is_none());
    assert_eq!(store.get(&"c".to_string(), true).unwrap(), Some(json!(3)));
}

#[test]
fn test_unfriendly_key_content_is_filesystem_safe() {
    let temp = TempDir::new().unwrap();
    let store = DiskStore::new(temp.path().join("cache")).unwrap();

    let key = "a/b\\c:d\u{1f}e ..".to_string();
    store.set(&key, json!("ok"), None, None, true).unwrap();
    assert_eq!(store.get(&key, true).unwrap(), Some(json!("ok")));
}

#[test]
fn test_overwrite_replaces_value() {
    let temp = TempDir::new().unwrap();
    let store = DiskStore::new(temp.path().join("cache")).unwrap();

    let key = "k".to_string();
    store.set(&key, json!(1), None, None, true).unwrap();
    store.set(&key, json!(2), None, None, true).unwrap();
    assert_eq!(store.get(&key, true).unwrap(), Some(json!(2)));
    assert_eq!(store.stats().entry_count, 1);
}

#[test]
fn test_stored_null_is_distinct_from_miss() {
    let temp = TempDir::new().unwrap();
    let store = DiskStore::new(temp.path().join("cache")).unwrap();

    let key = "nothing".to_string();
    assert_eq!(store.get(&key, true).unwrap(), None);

    store.set(&key, json!(null), None, None, true).unwrap();
    assert_eq!(store.get(&key, true).unwrap(), Some(json!(null)));
}
