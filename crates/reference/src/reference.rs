//! Record references
//!
//! A `RecordReference` is a stable, cheap handle for one record identity. It
//! holds a store handle and a key into the process-wide `ReferenceCache`;
//! it never holds record data. Every stateful operation delegates to the
//! store, so a reference stays valid whether its record is unloaded, loading,
//! loaded, or reloading.
//!
//! ## Operations
//!
//! | Operation | Suspends | Fails when |
//! |-----------|----------|------------|
//! | `record_type`, `id`, `identifier`, `remote_type` | no | never |
//! | `value` | no | never (returns `None` unless loaded) |
//! | `push` | on the pending document | the input or the store rejects it |
//! | `load`, `reload` | on the store fetch | no id (synchronously), or the fetch fails |
//!
//! `load` and `reload` return `StrataResult<impl Future>`: a missing id is a
//! contract violation reported before any asynchronous work exists, so it
//! cannot be lost in a future combinator chain.

use crate::cache::{ReferenceCache, ReferenceKey};
use std::fmt;
use std::future::{Future, IntoFuture};
use strata_core::{
    RecordIdentifier, RemoteType, SingleResourceDocument, StrataError, StrataResult,
};
use strata_store::{FindOptions, LoadState, Record, Store};
use tracing::trace;

/// Identity contract shared by every reference variant
///
/// Variants differ in how they resolve remotely (`remote_type`); they share
/// only identity access.
pub trait Reference {
    /// The identifier this reference is bound to
    fn identifier(&self) -> RecordIdentifier;

    /// How this variant resolves its record remotely
    fn remote_type(&self) -> RemoteType;

    /// The record type
    fn record_type(&self) -> String {
        self.identifier().record_type().to_string()
    }

    /// The record id, `None` for a record that has not been saved
    fn id(&self) -> Option<String> {
        self.identifier().id().map(str::to_string)
    }
}

/// Reference to a record found by its `(type, id)` identity
pub struct RecordReference {
    store: Store,
    key: ReferenceKey,
}

impl RecordReference {
    /// Bind a new reference to `identifier`
    pub(crate) fn new(store: Store, identifier: RecordIdentifier) -> Self {
        let key = ReferenceCache::global().register(identifier);
        trace!(target: "strata::reference", key = %key, "Registered reference");
        Self { store, key }
    }

    /// This reference's cache key
    pub fn key(&self) -> ReferenceKey {
        self.key
    }

    /// The store this reference reads through
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The identity's load state as the store reports it
    pub fn load_state(&self) -> LoadState {
        self.store.load_state(&self.identifier())
    }

    /// The loaded record, without fetching
    ///
    /// `None` unless the reference has an id and the store reports the
    /// identity `Loaded`.
    pub fn value(&self) -> Option<Record> {
        let identifier = self.identifier();
        if !identifier.has_id() {
            return None;
        }
        self.store.peek_record(&identifier)
    }

    /// Push a document, or a pending document, through the store
    ///
    /// Awaits `pending`, then normalizes the document with `Store::push` and
    /// returns the store's record. Accepts a `SingleResourceDocument`
    /// directly or any future resolving to one. Pushes are not ordered against
    /// each other; callers that need ordering must sequence them.
    ///
    /// # Errors
    ///
    /// Returns the pending input's error, or the store's normalization error.
    pub async fn push<P>(&self, pending: P) -> StrataResult<Record>
    where
        P: IntoFuture<Output = StrataResult<SingleResourceDocument>>,
    {
        let document = pending.await?;
        self.store.push(document)
    }

    /// Load the record, reusing loaded data or an in-flight fetch
    ///
    /// # Errors
    ///
    /// Returns `InvalidUsage` immediately if the reference has no id. The
    /// future fails with whatever the store's fetch produced.
    ///
    /// ```rust,ignore
    /// let record = reference.load()?.await?;
    /// ```
    pub fn load(&self) -> StrataResult<impl Future<Output = StrataResult<Record>> + Send + 'static> {
        self.find(FindOptions::default(), "load")
    }

    /// Fetch the record anew, bypassing loaded data and in-flight fetches
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn reload(
        &self,
    ) -> StrataResult<impl Future<Output = StrataResult<Record>> + Send + 'static> {
        self.find(FindOptions::reload(), "reload")
    }

    fn find(
        &self,
        options: FindOptions,
        operation: &str,
    ) -> StrataResult<impl Future<Output = StrataResult<Record>> + Send + 'static> {
        let identifier = self.identifier();
        let Some(id) = identifier.id() else {
            return Err(StrataError::invalid_usage(format!(
                "cannot {} a '{}' reference without an id",
                operation,
                identifier.record_type()
            )));
        };
        let store = self.store.clone();
        let record_type = identifier.record_type().to_string();
        let id = id.to_string();
        Ok(async move { store.find_record(&record_type, &id, options).await })
    }
}

impl Reference for RecordReference {
    fn identifier(&self) -> RecordIdentifier {
        match ReferenceCache::global().resolve(self.key) {
            Some(identifier) => identifier,
            None => unreachable!("reference {} is registered until dropped", self.key),
        }
    }

    fn remote_type(&self) -> RemoteType {
        RemoteType::Identity
    }
}

impl Clone for RecordReference {
    fn clone(&self) -> Self {
        Self::new(self.store.clone(), self.identifier())
    }
}

impl Drop for RecordReference {
    fn drop(&mut self) {
        ReferenceCache::global().release(self.key);
        trace!(target: "strata::reference", key = %self.key, "Released reference");
    }
}

impl fmt::Debug for RecordReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordReference")
            .field("key", &self.key)
            .field("identifier", &self.identifier())
            .finish()
    }
}
