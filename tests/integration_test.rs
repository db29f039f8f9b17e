use mapstore::engine::{ManualClock, MapIndex, MemStore};
use mapstore::sdk::{self, Dispatcher, OfflineAdapter, Options};
use mapstore::{AdapterError, FileInfo, KVStore, MapSource, NEW_MAP_ID};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

#[tokio::test]
async fn test_full_lifecycle_through_adapter() {
    let store = Arc::new(MemStore::new(HashMap::new(), None));
    let clock = Arc::new(ManualClock::new(0));
    let index = Arc::new(MapIndex::new(store.clone(), "offline").with_clock(clock.clone()));
    let adapter = OfflineAdapter::new(index.clone());

    let events = Arc::new(Mutex::new(Vec::new()));
    let e = events.clone();
    index.on_restored(move |id, _, info| e.lock().unwrap().push(format!("restored {} {}", id, info.description)));
    let e = events.clone();
    index.on_deleted(move |id| e.lock().unwrap().push(format!("deleted {}", id)));

    let first = index.save_new(r#"{"title":"Hello World!"}"#).unwrap();
    assert_eq!(first, "offline-map-1");

    clock.advance(5000);
    let imported = adapter.save_map(json!("file content"), NEW_MAP_ID, "file title.mup").await.unwrap();
    assert_eq!(imported, "offline-map-2");
    assert_eq!(index.list().unwrap()[&imported], FileInfo::new("file title", 5));

    let loaded = adapter.load_map(&imported).await.unwrap();
    assert_eq!(loaded.content, json!("file content"));
    assert_eq!(loaded.mime_type, "application/json");

    index.remove(&first).unwrap();
    assert_eq!(adapter.load_map(&first).await.unwrap_err(), AdapterError::NotFound);
    assert!(!index.list().unwrap().contains_key(&first));
    assert_eq!(index.save_new("next").unwrap(), "offline-map-3");

    assert_eq!(
        *events.lock().unwrap(),
        vec!["restored offline-map-2 file title", "deleted offline-map-1"]
    );
    assert_eq!(
        store.get("offline-maps").as_deref(),
        Some(r#"{"nextMapId":4,"maps":{"offline-map-2":{"d":"file title","t":5},"offline-map-3":{"d":"","t":5}}}"#)
    );
}

#[tokio::test]
async fn test_persisted_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let options = Options { data_dir: Some(dir.path().to_path_buf()), ..Options::default() };

    let id = {
        let adapter = sdk::open(options.clone()).unwrap();
        adapter.save_map(json!({"title": "kept", "ideas": {}}), NEW_MAP_ID, "kept.mup").await.unwrap()
    };

    let adapter = sdk::open(options).unwrap();
    let loaded = adapter.load_map(&id).await.unwrap();
    assert_eq!(loaded.content, json!({"title": "kept", "ideas": {}}));
    assert_eq!(adapter.index().list().unwrap()[&id].description, "kept");
}

#[tokio::test]
async fn test_dispatcher_falls_back_to_local_storage() {
    let adapter = Arc::new(sdk::open(Options::default()).unwrap());
    let dispatcher = Dispatcher::new(adapter.clone());

    // ids owned by another provider are copied into local storage under a fresh id
    let id = dispatcher.save_map(Value::String("doc".into()), "g123", "doc.mup").await.unwrap();
    assert_eq!(id, "offline-map-1");
    assert!(dispatcher.recognises(&id));
    assert_eq!(dispatcher.load_map(&id).await.unwrap().content, json!("doc"));
    assert_eq!(dispatcher.load_map("g123").await.unwrap_err(), AdapterError::NotFound);
}

#[tokio::test]
async fn test_quota_failure_is_normalized() {
    let adapter = sdk::open(Options { quota: Some(64), ..Options::default() }).unwrap();
    let err = adapter.save_map(json!("x".repeat(500)), NEW_MAP_ID, "b.mup").await.unwrap_err();
    assert_eq!(err.to_string(), "local-storage-failed");
}
