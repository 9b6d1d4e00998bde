//! Concurrency Tests
//!
//! Many references and tasks racing on one identity.

use crate::common::*;
use std::sync::Arc;
use tokio::sync::Barrier;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_loads_from_many_references_share_one_fetch() {
    let (store, adapter) = slow_store();
    adapter.insert(user("1", "@runspired"));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let reference = store.get_reference("user", "1");
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                reference.load()?.await
            })
        })
        .collect();

    let mut records = Vec::new();
    for handle in handles {
        records.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(adapter.request_count(), 1);
    assert!(records.iter().all(|r| r.ptr_eq(&records[0])));
    let metrics = store.metrics();
    assert_eq!(metrics.fetches_started, 1);
    assert_eq!(metrics.fetches_joined, 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_failure_reaches_every_waiter() {
    let (store, adapter) = slow_store();
    adapter.fail_next(StrataError::adapter("service unavailable"));
    let reference = store.get_reference("user", "1");

    let (a, b, c) = tokio::join!(
        reference.load().unwrap(),
        reference.load().unwrap(),
        reference.load().unwrap()
    );

    for result in [a, b, c] {
        assert_eq!(result.unwrap_err(), StrataError::adapter("service unavailable"));
    }
    assert_eq!(adapter.request_count(), 1);
    assert_eq!(store.metrics().fetches_failed, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn references_created_and_dropped_across_threads() {
    let (store, _) = memory_store();
    store.push(user_doc("1", "@runspired")).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..250 {
                    let reference = store.get_reference("user", "1");
                    assert!(reference.value().is_some());
                    assert_eq!(reference.clone().id().as_deref(), Some("1"));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
