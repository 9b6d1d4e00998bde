//! Stable record identifiers
//!
//! A `RecordIdentifier` names one logical record slot in the store. The store
//! issues exactly one identifier per `(type, id)` pair and hands out clones of
//! it, so identifiers are cheap to copy around and compare.
//!
//! ## Structure
//!
//! - `record_type`: The record's type (e.g. `"user"`)
//! - `id`: The remote id, absent for records created locally and not yet saved
//! - `lid`: Store-assigned local id, unique per slot and always present
//!
//! ## Invariants
//!
//! - `lid` and `record_type` never change
//! - `id` is assigned at most once; once visible it never changes
//! - Equality and hashing use `lid` only

use crate::error::{StrataError, StrataResult};
use once_cell::sync::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

struct IdentifierInner {
    lid: String,
    record_type: String,
    id: OnceCell<String>,
}

/// Stable identity of a record slot
///
/// Cloning shares the slot: every clone observes an id assigned through any
/// other clone.
#[derive(Clone)]
pub struct RecordIdentifier {
    inner: Arc<IdentifierInner>,
}

impl RecordIdentifier {
    /// Create an identifier
    ///
    /// Normally only the store's identifier cache calls this; everything else
    /// obtains identifiers from the store.
    pub fn new(lid: impl Into<String>, record_type: impl Into<String>, id: Option<String>) -> Self {
        let cell = OnceCell::new();
        if let Some(id) = id {
            let _ = cell.set(id);
        }
        Self {
            inner: Arc::new(IdentifierInner {
                lid: lid.into(),
                record_type: record_type.into(),
                id: cell,
            }),
        }
    }

    /// The record type
    pub fn record_type(&self) -> &str {
        &self.inner.record_type
    }

    /// The remote id, or `None` for an unsaved record
    pub fn id(&self) -> Option<&str> {
        self.inner.id.get().map(String::as_str)
    }

    /// The store-assigned local id
    pub fn lid(&self) -> &str {
        &self.inner.lid
    }

    /// Whether the identifier carries a remote id
    pub fn has_id(&self) -> bool {
        self.inner.id.get().is_some()
    }

    /// Assign the remote id of a locally created record
    ///
    /// Succeeds when the id is unset or already equal to `id`. Reserved for the
    /// store's normalization of pushed documents.
    ///
    /// # Errors
    ///
    /// Returns `Normalization` if a different id was already assigned.
    pub fn assign_id(&self, id: &str) -> StrataResult<()> {
        let current = self.inner.id.get_or_init(|| id.to_string());
        if current == id {
            Ok(())
        } else {
            Err(StrataError::normalization(format!(
                "identifier {} already has id '{}', cannot reassign to '{}'",
                self.inner.lid, current, id
            )))
        }
    }

    /// Whether both handles point at the same shared slot
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for RecordIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.inner.lid == other.inner.lid
    }
}

impl Eq for RecordIdentifier {}

impl Hash for RecordIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.lid.hash(state);
    }
}

impl fmt::Debug for RecordIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordIdentifier")
            .field("type", &self.record_type())
            .field("id", &self.id())
            .field("lid", &self.lid())
            .finish()
    }
}

impl fmt::Display for RecordIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Some(id) => write!(f, "{}:{}", self.record_type(), id),
            None => write!(f, "{}:{}", self.record_type(), self.lid()),
        }
    }
}
