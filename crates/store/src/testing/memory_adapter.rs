//! In-memory adapter with request accounting

use crate::adapter::{Adapter, FetchRequest};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use strata_core::{ResourceObject, SingleResourceDocument, StrataError, StrataResult};

/// Adapter serving fixtures from memory
///
/// - Missing fixtures answer `NotFound`
/// - `with_latency` delays every response (Tokio timer)
/// - `fail_next` queues errors returned before any fixture lookup
pub struct MemoryAdapter {
    fixtures: DashMap<(String, String), ResourceObject>,
    failures: Mutex<VecDeque<StrataError>>,
    requests: Mutex<Vec<FetchRequest>>,
    request_count: AtomicU64,
    latency: Option<Duration>,
}

impl MemoryAdapter {
    /// Create an empty adapter
    pub fn new() -> Self {
        Self {
            fixtures: DashMap::new(),
            failures: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            request_count: AtomicU64::new(0),
            latency: None,
        }
    }

    /// Delay every response by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Serve `resource` for its own `(type, id)`
    ///
    /// Resources without an id are ignored.
    pub fn insert(&self, resource: ResourceObject) {
        if let Some(id) = resource.id.clone() {
            self.fixtures
                .insert((resource.record_type.clone(), id), resource);
        }
    }

    /// Serve `resource` when `(record_type, id)` is requested
    pub fn insert_as(&self, record_type: &str, id: &str, resource: ResourceObject) {
        self.fixtures
            .insert((record_type.to_string(), id.to_string()), resource);
    }

    /// Stop serving `(record_type, id)`
    pub fn remove(&self, record_type: &str, id: &str) {
        self.fixtures
            .remove(&(record_type.to_string(), id.to_string()));
    }

    /// Fail the next request with `error`
    pub fn fail_next(&self, error: StrataError) {
        self.failures.lock().push_back(error);
    }

    /// Requests received so far
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    fn name(&self) -> &str {
        "memory"
    }

    async fn find_record(&self, request: &FetchRequest) -> StrataResult<SingleResourceDocument> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }

        let key = (request.record_type().to_string(), request.id().to_string());
        self.fixtures
            .get(&key)
            .map(|resource| SingleResourceDocument::new(resource.clone()))
            .ok_or_else(|| StrataError::not_found(request.record_type(), request.id()))
    }
}
