//! In-flight fetch table
//!
//! Per-identity singleflight: the first non-reload fetch of an identity
//! registers an `InFlightFetch`, and every later non-reload fetch of the same
//! identity waits on it instead of calling the adapter again. A reload always
//! registers a new entry, replacing the old one, so loads issued after a reload
//! observe the reload's result.
//!
//! Results are published through a `watch` channel. Every caller, including
//! the one that started the fetch, receives its result from the channel.

use crate::record::Record;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use strata_core::{StrataError, StrataResult};
use tokio::sync::watch;

type FetchOutcome = Option<StrataResult<Record>>;

/// One adapter fetch that callers can wait on
pub(crate) struct InFlightFetch {
    tx: watch::Sender<FetchOutcome>,
    rx: watch::Receiver<FetchOutcome>,
}

impl InFlightFetch {
    fn new() -> Self {
        let (tx, rx) = watch::channel(None);
        Self { tx, rx }
    }

    /// Publish the result; later calls are ignored
    pub(crate) fn publish(&self, result: StrataResult<Record>) {
        self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(result);
            true
        });
    }

    /// Wait for the published result
    pub(crate) async fn wait(&self) -> StrataResult<Record> {
        let mut rx = self.rx.clone();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(result) = current {
                return result;
            }
            if rx.changed().await.is_err() {
                return Err(StrataError::internal(
                    "fetch dropped without publishing a result",
                ));
            }
        }
    }
}

/// In-flight fetches keyed by identifier `lid`
#[derive(Default)]
pub(crate) struct InFlightTable {
    requests: Mutex<HashMap<String, Arc<InFlightFetch>>>,
}

impl InFlightTable {
    /// Join the identity's in-flight fetch, or register a new one
    ///
    /// Returns the fetch and whether the caller registered it.
    pub(crate) fn join_or_register(&self, lid: &str) -> (Arc<InFlightFetch>, bool) {
        let mut requests = self.requests.lock();
        if let Some(existing) = requests.get(lid) {
            return (existing.clone(), false);
        }
        let fetch = Arc::new(InFlightFetch::new());
        requests.insert(lid.to_string(), fetch.clone());
        (fetch, true)
    }

    /// Register a new fetch, replacing any in-flight one
    pub(crate) fn register(&self, lid: &str) -> Arc<InFlightFetch> {
        let fetch = Arc::new(InFlightFetch::new());
        self.requests.lock().insert(lid.to_string(), fetch.clone());
        fetch
    }

    /// Remove the entry for `lid` if it is still `fetch`
    pub(crate) fn remove(&self, lid: &str, fetch: &Arc<InFlightFetch>) {
        let mut requests = self.requests.lock();
        if requests
            .get(lid)
            .is_some_and(|current| Arc::ptr_eq(current, fetch))
        {
            requests.remove(lid);
        }
    }

    pub(crate) fn is_pending(&self, lid: &str) -> bool {
        self.requests.lock().contains_key(lid)
    }

    pub(crate) fn len(&self) -> usize {
        self.requests.lock().len()
    }
}
