//! Push Tests

use crate::common::*;
use std::time::Duration;

#[tokio::test]
async fn push_then_value_returns_pushed_record() {
    let (store, adapter) = memory_store();
    let reference = store.get_reference("user", "1");

    let record = reference.push(user_doc("1", "@runspired")).await.unwrap();

    assert!(reference.value().unwrap().ptr_eq(&record));
    assert_eq!(reference.load_state(), LoadState::Loaded);
    assert_eq!(adapter.request_count(), 0);
}

#[tokio::test]
async fn push_through_one_reference_is_visible_through_another() {
    let (store, _) = memory_store();
    let a = store.get_reference("user", "1");
    let b = store.get_reference("user", "1");
    assert!(b.value().is_none());

    let record = a.push(user_doc("1", "@runspired")).await.unwrap();

    assert_eq!(a.identifier(), b.identifier());
    assert!(b.value().unwrap().ptr_eq(&record));
    assert_eq!(b.load_state(), LoadState::Loaded);
}

#[tokio::test]
async fn push_awaits_a_pending_document() {
    let (store, _) = memory_store();
    let reference = store.get_reference("user", "1");

    let pending = async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok::<_, StrataError>(user_doc("1", "@runspired"))
    };
    let record = reference.push(pending).await.unwrap();

    assert_eq!(
        record.attribute("username"),
        Some(serde_json::json!("@runspired"))
    );
    assert!(reference.value().is_some());
}

#[tokio::test]
async fn push_accepts_a_spawned_document() {
    let (store, _) = memory_store();
    let reference = store.get_reference("user", "1");

    let task = tokio::spawn(async { user_doc("1", "@runspired") });
    let record = reference
        .push(async move {
            task.await
                .map_err(|e| StrataError::internal(e.to_string()))
        })
        .await
        .unwrap();

    assert!(reference.value().unwrap().ptr_eq(&record));
}

#[tokio::test]
async fn push_after_load_merges_into_same_instance() {
    let (store, adapter) = memory_store();
    adapter.insert(user("1", "@runspired").with_attribute("name", "Chris"));
    let reference = store.get_reference("user", "1");
    let loaded = reference.load().unwrap().await.unwrap();

    let pushed = reference.push(user_doc("1", "@chris")).await.unwrap();

    assert!(pushed.ptr_eq(&loaded));
    assert_eq!(pushed.attribute("username"), Some(serde_json::json!("@chris")));
    assert_eq!(pushed.attribute("name"), Some(serde_json::json!("Chris")));
}

#[tokio::test]
async fn push_makes_later_load_skip_the_adapter() {
    let (store, adapter) = memory_store();
    let reference = store.get_reference("user", "1");
    let pushed = reference.push(user_doc("1", "@runspired")).await.unwrap();

    let loaded = reference.load().unwrap().await.unwrap();

    assert!(loaded.ptr_eq(&pushed));
    assert_eq!(adapter.request_count(), 0);
}

#[tokio::test]
async fn push_assigns_id_to_locally_created_record() {
    let (store, _) = memory_store();
    let created = store.create_record("user", serde_json::Map::new());
    let reference = store.reference_for_record(&created);
    assert_eq!(reference.id(), None);

    let saved = ResourceObject::new("user", Some("7"))
        .with_lid(created.identifier().lid())
        .with_attribute("username", "@saved");
    let record = reference.push(SingleResourceDocument::new(saved)).await.unwrap();

    assert!(record.ptr_eq(&created));
    assert_eq!(reference.id().as_deref(), Some("7"));
    assert!(reference.value().unwrap().ptr_eq(&created));
    assert!(store
        .get_reference("user", "7")
        .identifier()
        .ptr_eq(&reference.identifier()));
}

#[tokio::test]
async fn rejected_document_leaves_value_untouched() {
    let (store, _) = memory_store();
    let reference = store.get_reference("user", "1");

    let err = reference
        .push(SingleResourceDocument::new(ResourceObject::new("", Some("1"))))
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "Normalization");
    assert!(reference.value().is_none());
}
