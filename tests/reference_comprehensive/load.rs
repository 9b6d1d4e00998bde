//! Load / Reload Tests

use crate::common::*;

#[tokio::test]
async fn load_fetches_once_then_serves_loaded_data() {
    let (store, adapter) = memory_store();
    adapter.insert(user("1", "@runspired"));
    let reference = store.get_reference("user", "1");

    let first = reference.load().unwrap().await.unwrap();
    let second = reference.load().unwrap().await.unwrap();

    assert!(first.ptr_eq(&second));
    assert_eq!(adapter.request_count(), 1);
    assert_eq!(reference.value(), Some(first));
}

#[tokio::test]
async fn overlapping_loads_share_one_fetch() {
    let (store, adapter) = slow_store();
    adapter.insert(user("1", "@runspired"));
    let reference = store.get_reference("user", "1");

    let (a, b) = tokio::join!(reference.load().unwrap(), reference.load().unwrap());

    assert!(a.unwrap().ptr_eq(&b.unwrap()));
    assert_eq!(adapter.request_count(), 1);
    assert_eq!(store.metrics().fetches_joined, 1);
}

#[tokio::test]
async fn reload_always_fetches() {
    let (store, adapter) = memory_store();
    adapter.insert(user("1", "@runspired"));
    let reference = store.get_reference("user", "1");

    let loaded = reference.load().unwrap().await.unwrap();
    adapter.insert(user("1", "@runspired-renamed"));
    let reloaded = reference.reload().unwrap().await.unwrap();

    assert_eq!(adapter.request_count(), 2);
    assert!(adapter.requests()[1].reload);
    assert!(loaded.ptr_eq(&reloaded));
    assert_eq!(
        reloaded.attribute("username"),
        Some(serde_json::json!("@runspired-renamed"))
    );
}

#[tokio::test]
async fn overlapping_reloads_each_fetch() {
    let (store, adapter) = slow_store();
    adapter.insert(user("1", "@runspired"));
    let reference = store.get_reference("user", "1");

    let (a, b) = tokio::join!(reference.reload().unwrap(), reference.reload().unwrap());

    assert!(a.is_ok() && b.is_ok());
    assert_eq!(adapter.request_count(), 2);
}

#[tokio::test]
async fn value_is_none_while_reloading() {
    let (store, adapter) = slow_store();
    adapter.insert(user("1", "@runspired"));
    let reference = store.get_reference("user", "1");
    reference.load().unwrap().await.unwrap();

    let reload = tokio::spawn(reference.reload().unwrap());
    tokio::time::sleep(SLOW / 5).await;
    assert_eq!(reference.load_state(), LoadState::Reloading);
    assert!(reference.value().is_none());

    reload.await.unwrap().unwrap();
    assert_eq!(reference.load_state(), LoadState::Loaded);
    assert!(reference.value().is_some());
}

#[tokio::test]
async fn failed_reload_keeps_loaded_record() {
    let (store, adapter) = memory_store();
    adapter.insert(user("1", "@runspired"));
    let reference = store.get_reference("user", "1");
    let loaded = reference.load().unwrap().await.unwrap();

    adapter.fail_next(StrataError::adapter("connection reset"));
    let err = reference.reload().unwrap().await.unwrap_err();

    assert!(err.is_retriable());
    assert!(reference.value().unwrap().ptr_eq(&loaded));
}

#[test]
fn load_without_id_fails_synchronously() {
    let (store, adapter) = memory_store();
    let reference = store.reference_for(&store.identifier_for("user", None));

    for err in [reference.load().err(), reference.reload().err()] {
        let err = err.unwrap();
        assert_eq!(err.error_code(), "InvalidUsage");
        assert!(err.to_string().contains("'user'"));
    }
    assert_eq!(adapter.request_count(), 0);
}

#[tokio::test]
async fn load_times_out_per_config() {
    init_tracing();
    let adapter = std::sync::Arc::new(MemoryAdapter::new().with_latency(SLOW * 4));
    adapter.insert(user("1", "@runspired"));
    let config = StoreConfig {
        fetch_timeout_ms: Some(10),
        ..StoreConfig::default()
    };
    let store = Store::with_config(adapter, config).unwrap();
    let reference = store.get_reference("user", "1");

    let err = reference.load().unwrap().await.unwrap_err();
    assert!(matches!(err, StrataError::Timeout { timeout_ms: 10, .. }));
    assert!(reference.value().is_none());
}
