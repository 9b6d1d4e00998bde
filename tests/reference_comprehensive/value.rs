//! Synchronous Value Tests
//!
//! `value()` never fetches and is `None` unless the identity is loaded.

use crate::common::*;

#[test]
fn value_is_none_before_anything_happens() {
    let (store, adapter) = memory_store();
    adapter.insert(user("1", "@runspired"));
    let reference = store.get_reference("user", "1");

    assert!(reference.value().is_none());
    assert_eq!(adapter.request_count(), 0);
}

#[test]
fn value_returns_the_pushed_instance() {
    let (store, _) = memory_store();
    let reference = store.get_reference("user", "1");
    let record = store.push(user_doc("1", "@runspired")).unwrap();

    let value = reference.value().unwrap();
    assert!(value.ptr_eq(&record));
    assert_eq!(
        value.attribute("username"),
        Some(serde_json::json!("@runspired"))
    );
}

#[tokio::test]
async fn value_is_none_while_loading() {
    let (store, adapter) = slow_store();
    adapter.insert(user("1", "@runspired"));
    let reference = store.get_reference("user", "1");

    let load = tokio::spawn(reference.load().unwrap());
    tokio::time::sleep(SLOW / 5).await;
    assert_eq!(reference.load_state(), LoadState::Loading);
    assert!(reference.value().is_none());

    load.await.unwrap().unwrap();
    assert!(reference.value().is_some());
}

#[tokio::test]
async fn value_is_none_after_failed_load() {
    let (store, adapter) = memory_store();
    let reference = store.get_reference("user", "404");

    let err = reference.load().unwrap().await.unwrap_err();
    assert_eq!(err, StrataError::not_found("user", "404"));
    assert!(reference.value().is_none());
    assert_eq!(reference.load_state(), LoadState::NotLoaded);
    assert_eq!(adapter.request_count(), 1);
}

#[test]
fn value_is_none_without_an_id() {
    let (store, _) = memory_store();
    let record = store.create_record("user", serde_json::Map::new());
    let reference = store.reference_for_record(&record);

    assert_eq!(reference.id(), None);
    assert!(reference.value().is_none());
}
