//! The record store
//!
//! `Store` owns the authoritative identity map: one identifier per identity,
//! at most one `Record` instance per identifier, and the load state of every
//! identity it has seen. Pushed documents and adapter responses are merged
//! through the same normalization path, so observers always see one instance.
//!
//! ## Fetching
//!
//! `find_record` returns loaded data without suspending unless a reload is
//! forced. Otherwise it hands the identity to the in-flight table:
//!
//! 1. A non-reload request joins the identity's in-flight fetch if one exists.
//! 2. Otherwise (and always for reloads) it registers a new fetch, marks the
//!    identity `Loading`/`Reloading`, and spawns the adapter call on the
//!    current Tokio runtime.
//! 3. The spawned task normalizes the response, settles the load state, and
//!    publishes the result to every waiter.
//!
//! Because the adapter call runs in its own task, dropping a caller's future
//! never cancels a fetch other callers may be waiting on.
//!
//! ## Concurrency
//!
//! `DashMap` shard locks and the in-flight table's mutex are never held
//! across an `.await`.

use crate::adapter::{Adapter, FetchRequest, FindOptions};
use crate::config::StoreConfig;
use crate::identifiers::IdentifierCache;
use crate::inflight::{InFlightFetch, InFlightTable};
use crate::metrics::{StoreCounters, StoreMetrics};
use crate::record::Record;
use crate::state::{LoadState, RecordEntry};
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use strata_core::{
    RecordIdentifier, ResourceObject, SingleResourceDocument, StrataError, StrataResult,
};
use tracing::{debug, warn};

pub(crate) struct StoreInner {
    config: StoreConfig,
    adapter: Arc<dyn Adapter>,
    identifiers: IdentifierCache,
    entries: DashMap<String, RecordEntry>,
    inflight: InFlightTable,
    counters: StoreCounters,
}

/// Identity-mapped record store
///
/// Cheap to clone; clones share one identity map.
///
/// # Example
///
/// ```rust,ignore
/// use strata_store::{FindOptions, Store};
/// use strata_store::testing::MemoryAdapter;
///
/// let adapter = Arc::new(MemoryAdapter::new());
/// let store = Store::new(adapter);
///
/// let user = store.find_record("user", "1", FindOptions::default()).await?;
/// let same = store.peek_record(user.identifier());
/// assert_eq!(same, Some(user));
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Create a store with the default configuration
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        Self::build(adapter, StoreConfig::default())
    }

    /// Create a store with a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `Config` if `config` fails validation.
    pub fn with_config(adapter: Arc<dyn Adapter>, config: StoreConfig) -> StrataResult<Self> {
        config.validate()?;
        Ok(Self::build(adapter, config))
    }

    fn build(adapter: Arc<dyn Adapter>, config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                identifiers: IdentifierCache::new(config.lid_prefix.clone()),
                config,
                adapter,
                entries: DashMap::new(),
                inflight: InFlightTable::default(),
                counters: StoreCounters::default(),
            }),
        }
    }

    /// The store's configuration
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Current counters
    pub fn metrics(&self) -> StoreMetrics {
        self.inner.counters.snapshot()
    }

    /// Whether both handles share one identity map
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// The identifier for `record_type` and `id`
    ///
    /// With an id, returns the one identifier for that identity. Without an
    /// id, every call creates a new identity slot.
    pub fn identifier_for(&self, record_type: &str, id: Option<&str>) -> RecordIdentifier {
        match id {
            Some(id) => self.inner.identifiers.get_or_create(record_type, id),
            None => self.inner.identifiers.create_local(record_type),
        }
    }

    /// The identifier for `(record_type, id)` if the store has issued one
    pub fn peek_identifier(&self, record_type: &str, id: &str) -> Option<RecordIdentifier> {
        self.inner.identifiers.peek(record_type, id)
    }

    /// The identifier registered under `lid`, if any
    pub fn identifier_by_lid(&self, lid: &str) -> Option<RecordIdentifier> {
        self.inner.identifiers.by_lid(lid)
    }

    /// Number of identities the store has issued
    pub fn identifier_count(&self) -> usize {
        self.inner.identifiers.len()
    }

    // =========================================================================
    // Synchronous Reads
    // =========================================================================

    /// Load state of an identity
    pub fn load_state(&self, identifier: &RecordIdentifier) -> LoadState {
        if !identifier.has_id() {
            return LoadState::Unresolved;
        }
        self.inner
            .entries
            .get(identifier.lid())
            .map(|entry| entry.state)
            .unwrap_or(LoadState::NotLoaded)
    }

    /// The record for `identifier` if it is currently loaded
    ///
    /// Never fetches and never suspends.
    pub fn peek_record(&self, identifier: &RecordIdentifier) -> Option<Record> {
        self.inner
            .entries
            .get(identifier.lid())
            .and_then(|entry| entry.loaded().cloned())
    }

    /// Whether a fetch for `identifier` is in flight
    pub fn is_fetching(&self, identifier: &RecordIdentifier) -> bool {
        self.inner.inflight.is_pending(identifier.lid())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Normalize a single-resource document into the identity map
    ///
    /// The document's attributes and relationships are merged into the
    /// identity's existing record instance, or a new one. The identity becomes
    /// `Loaded`. A document without an id gets a fresh identity unless it
    /// carries a known `lid`; a document with both assigns the id to that
    /// `lid`'s identity.
    ///
    /// # Errors
    ///
    /// Returns `Normalization` if the document's identity is malformed or
    /// conflicts with an existing one.
    pub fn push(&self, document: SingleResourceDocument) -> StrataResult<Record> {
        let resource = document.data;
        let identifier = self.inner.identifiers.resolve(&resource)?;
        let record = self.inner.merge(&identifier, resource, Settle::Push);
        self.inner.counters.record_push();
        debug!(target: "strata::store", identifier = %identifier, "Pushed record");
        Ok(record)
    }

    /// Create a record locally, without a remote id
    pub fn create_record(&self, record_type: &str, attributes: Map<String, Value>) -> Record {
        let identifier = self.inner.identifiers.create_local(record_type);
        let mut resource = ResourceObject::new(record_type, None);
        resource.attributes = attributes;
        let record = self.inner.merge(&identifier, resource, Settle::Push);
        debug!(target: "strata::store", identifier = %identifier, "Created local record");
        record
    }

    /// Drop the record data held for `identifier`
    ///
    /// The identifier stays valid; a later load fetches again and produces a
    /// new record instance. Returns whether data was dropped.
    pub fn unload_record(&self, identifier: &RecordIdentifier) -> bool {
        let Some(mut entry) = self.inner.entries.get_mut(identifier.lid()) else {
            return false;
        };
        let had_record = entry.record.is_some();
        entry.unload();
        debug!(target: "strata::store", identifier = %identifier, "Unloaded record");
        had_record
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Resolve a record by `(record_type, id)`
    ///
    /// Returns loaded data immediately unless `options.reload` is set.
    /// Concurrent non-reload requests for one identity share one adapter
    /// fetch; a reload always issues its own.
    ///
    /// Must be polled inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUsage` for an empty type or id, `Internal` outside a
    /// Tokio runtime, and otherwise whatever the adapter or normalization
    /// produced.
    pub async fn find_record(
        &self,
        record_type: &str,
        id: &str,
        options: FindOptions,
    ) -> StrataResult<Record> {
        if record_type.is_empty() || id.is_empty() {
            return Err(StrataError::invalid_usage(format!(
                "find_record requires a type and an id, got '{}' and '{}'",
                record_type, id
            )));
        }
        let identifier = self.identifier_for(record_type, Some(id));
        if !options.reload {
            if let Some(record) = self.peek_record(&identifier) {
                return Ok(record);
            }
        }
        let fetch = self.start_fetch(identifier, options.reload)?;
        fetch.wait().await
    }

    fn start_fetch(
        &self,
        identifier: RecordIdentifier,
        reload: bool,
    ) -> StrataResult<Arc<InFlightFetch>> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            StrataError::internal("find_record must be polled inside a Tokio runtime")
        })?;
        let lid = identifier.lid().to_string();

        let (fetch, registered) = if reload {
            (self.inner.inflight.register(&lid), true)
        } else {
            self.inner.inflight.join_or_register(&lid)
        };

        if !registered {
            self.inner.counters.record_fetch_joined();
            debug!(target: "strata::store", identifier = %identifier, "Joining in-flight fetch");
            return Ok(fetch);
        }

        let seq = self
            .inner
            .entries
            .entry(lid.clone())
            .or_insert_with(RecordEntry::empty)
            .begin_fetch();
        self.inner.counters.record_fetch_started();
        debug!(
            target: "strata::store",
            identifier = %identifier,
            reload,
            adapter = self.inner.adapter.name(),
            "Fetch started"
        );

        let guard = FetchGuard {
            inner: self.inner.clone(),
            lid,
            fetch: fetch.clone(),
            seq,
            settled: false,
        };
        let request = FetchRequest { identifier, reload };
        runtime.spawn(guard.run(request));
        Ok(fetch)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("adapter", &self.inner.adapter.name())
            .field("identifiers", &self.inner.identifiers.len())
            .field("in_flight", &self.inner.inflight.len())
            .finish()
    }
}

/// How a merge settles the identity's load state
#[derive(Clone, Copy)]
enum Settle {
    Push,
    /// Fetch with the sequence number `begin_fetch` gave it
    Fetch(u64),
}

impl StoreInner {
    /// Merge `resource` into the identity's record under the entry lock
    ///
    /// A fetch that started before an already-applied fetch only settles its
    /// load state: its data is older and is not merged over the newer data.
    fn merge(&self, identifier: &RecordIdentifier, resource: ResourceObject, settle: Settle) -> Record {
        let mut entry = self
            .entries
            .entry(identifier.lid().to_string())
            .or_insert_with(RecordEntry::empty);
        let superseded = match settle {
            Settle::Push => false,
            Settle::Fetch(seq) => entry.record.is_some() && entry.is_superseded(seq),
        };
        let record = entry
            .record
            .get_or_insert_with(|| Record::new(identifier.clone()))
            .clone();
        if superseded {
            debug!(target: "strata::store", identifier = %identifier, "Skipped superseded fetch data");
        } else {
            record.merge(resource);
        }
        match settle {
            Settle::Push => entry.complete_push(record.clone()),
            Settle::Fetch(seq) => entry.complete_fetch(seq, record.clone()),
        }
        record
    }

    async fn fetch_document(&self, request: &FetchRequest) -> StrataResult<SingleResourceDocument> {
        match self.config.fetch_timeout() {
            None => self.adapter.find_record(request).await,
            Some(timeout) => tokio::time::timeout(timeout, self.adapter.find_record(request))
                .await
                .map_err(|_| StrataError::Timeout {
                    record_type: request.record_type().to_string(),
                    id: request.id().to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })?,
        }
    }

    /// Check that the adapter answered for the requested identity
    fn check_response(
        &self,
        request: &FetchRequest,
        mut document: SingleResourceDocument,
    ) -> StrataResult<ResourceObject> {
        let resource = &mut document.data;
        if resource.id.is_none() {
            resource.id = Some(request.id().to_string());
        }
        if resource.record_type != request.record_type()
            || resource.id.as_deref() != Some(request.id())
        {
            return Err(StrataError::normalization(format!(
                "adapter '{}' returned {}:{} for {}",
                self.adapter.name(),
                resource.record_type,
                resource.id.as_deref().unwrap_or_default(),
                request.identifier
            )));
        }
        Ok(document.data)
    }
}

/// Owns one registered fetch until its result is published
///
/// Dropped unsettled (the task panicked or the runtime shut down), it settles
/// the load state as failed and publishes an `Internal` error so waiters
/// never hang.
struct FetchGuard {
    inner: Arc<StoreInner>,
    lid: String,
    fetch: Arc<InFlightFetch>,
    seq: u64,
    settled: bool,
}

impl FetchGuard {
    async fn run(mut self, request: FetchRequest) {
        let response = self.inner.fetch_document(&request).await;
        let result = response
            .and_then(|document| self.inner.check_response(&request, document))
            .map(|resource| {
                self.inner
                    .merge(&request.identifier, resource, Settle::Fetch(self.seq))
            });

        match &result {
            Ok(_) => {
                debug!(target: "strata::store", identifier = %request.identifier, "Fetch completed");
            }
            Err(e) => {
                self.fail_entry();
                self.inner.counters.record_fetch_failed();
                warn!(target: "strata::store", identifier = %request.identifier, error = %e, "Fetch failed");
            }
        }
        self.settle(result);
    }

    fn fail_entry(&self) {
        if let Some(mut entry) = self.inner.entries.get_mut(&self.lid) {
            entry.fail_fetch();
        }
    }

    fn settle(&mut self, result: StrataResult<Record>) {
        self.settled = true;
        self.inner.inflight.remove(&self.lid, &self.fetch);
        self.fetch.publish(result);
    }
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.fail_entry();
        self.inner.counters.record_fetch_failed();
        warn!(target: "strata::store", lid = %self.lid, "Fetch abandoned before settling");
        self.settle(Err(StrataError::internal(format!(
            "fetch for {} was abandoned before it settled",
            self.lid
        ))));
    }
}
