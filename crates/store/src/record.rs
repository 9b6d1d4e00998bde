//! Materialized record instances
//!
//! A `Record` is the object the identity map hands out for a loaded identity.
//! Pushes and fetches for the same identity merge into the same instance, so
//! equality is instance identity, not field equality.

use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use strata_core::{RecordIdentifier, ResourceObject};

struct RecordInner {
    identifier: RecordIdentifier,
    attributes: RwLock<Map<String, Value>>,
    relationships: RwLock<Map<String, Value>>,
}

/// A record materialized by the store
#[derive(Clone)]
pub struct Record {
    inner: Arc<RecordInner>,
}

impl Record {
    pub(crate) fn new(identifier: RecordIdentifier) -> Self {
        Self {
            inner: Arc::new(RecordInner {
                identifier,
                attributes: RwLock::new(Map::new()),
                relationships: RwLock::new(Map::new()),
            }),
        }
    }

    /// Merge a resource's attributes and relationships into this instance.
    ///
    /// Keys present in `resource` overwrite; absent keys are kept.
    pub(crate) fn merge(&self, resource: ResourceObject) {
        if !resource.attributes.is_empty() {
            let mut attributes = self.inner.attributes.write();
            for (name, value) in resource.attributes {
                attributes.insert(name, value);
            }
        }
        if !resource.relationships.is_empty() {
            let mut relationships = self.inner.relationships.write();
            for (name, value) in resource.relationships {
                relationships.insert(name, value);
            }
        }
    }

    /// The record's identifier
    pub fn identifier(&self) -> &RecordIdentifier {
        &self.inner.identifier
    }

    /// The record type
    pub fn record_type(&self) -> &str {
        self.inner.identifier.record_type()
    }

    /// The remote id, if assigned
    pub fn id(&self) -> Option<&str> {
        self.inner.identifier.id()
    }

    /// A single attribute value
    pub fn attribute(&self, name: &str) -> Option<Value> {
        self.inner.attributes.read().get(name).cloned()
    }

    /// Snapshot of all attributes
    pub fn attributes(&self) -> Map<String, Value> {
        self.inner.attributes.read().clone()
    }

    /// Raw relationship payload
    pub fn relationship(&self, name: &str) -> Option<Value> {
        self.inner.relationships.read().get(name).cloned()
    }

    /// Whether both handles are the same instance
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Record {}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("identifier", &self.inner.identifier)
            .field("attributes", &*self.inner.attributes.read())
            .finish()
    }
}
