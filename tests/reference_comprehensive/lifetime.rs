//! Reference Lifetime Tests
//!
//! References never own record data: dropping or unloading on one side
//! leaves the other side valid.

use crate::common::*;

#[test]
fn dropped_reference_frees_its_cache_slot() {
    let (store, _) = memory_store();
    let reference = store.get_reference("user", "1");
    let key = reference.key();

    drop(reference);

    assert!(ReferenceCache::global().resolve(key).is_none());
}

#[test]
fn dropping_one_reference_keeps_the_other_valid() {
    let (store, _) = memory_store();
    let a = store.get_reference("user", "1");
    let b = a.clone();
    let identifier = a.identifier();

    drop(a);

    assert!(b.identifier().ptr_eq(&identifier));
    assert_eq!(b.id().as_deref(), Some("1"));
}

#[test]
fn dropping_references_keeps_record_in_store() {
    let (store, _) = memory_store();
    let record = store.push(user_doc("1", "@runspired")).unwrap();
    drop(store.get_reference("user", "1"));

    assert!(store.peek_record(record.identifier()).is_some());
    assert!(store.get_reference("user", "1").value().unwrap().ptr_eq(&record));
}

#[tokio::test]
async fn reference_survives_unload() {
    let (store, adapter) = memory_store();
    adapter.insert(user("1", "@runspired"));
    let reference = store.get_reference("user", "1");
    let first = reference.load().unwrap().await.unwrap();

    assert!(store.unload_record(&reference.identifier()));
    assert!(reference.value().is_none());
    assert_eq!(reference.load_state(), LoadState::NotLoaded);
    assert_eq!(reference.id().as_deref(), Some("1"));

    let second = reference.load().unwrap().await.unwrap();
    assert!(!second.ptr_eq(&first));
    assert_eq!(adapter.request_count(), 2);
}

#[tokio::test]
async fn dropped_load_future_does_not_cancel_fetch() {
    let (store, adapter) = slow_store();
    adapter.insert(user("1", "@runspired"));
    let reference = store.get_reference("user", "1");

    let abandoned = tokio::time::timeout(SLOW / 5, reference.load().unwrap()).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(SLOW * 2).await;
    assert!(reference.value().is_some());
    assert_eq!(adapter.request_count(), 1);
}
