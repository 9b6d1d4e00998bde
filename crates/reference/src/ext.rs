//! Store extension for constructing references
//!
//! References are only ever constructed here, on the store side: this is the
//! one place that writes new entries into the reference cache (apart from
//! `Clone`, which constructs a new reference to the same identity).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use strata_reference::{Reference, StoreReferenceExt};
//!
//! let user = store.get_reference("user", "1");
//! assert_eq!(user.id().as_deref(), Some("1"));
//! let record = user.load()?.await?;
//! ```

use crate::reference::RecordReference;
use strata_core::RecordIdentifier;
use strata_store::{Record, Store};

/// Reference construction on a `Store`
pub trait StoreReferenceExt {
    /// A reference to the `(record_type, id)` identity
    fn get_reference(&self, record_type: &str, id: &str) -> RecordReference;

    /// A reference bound to an identifier this store issued
    fn reference_for(&self, identifier: &RecordIdentifier) -> RecordReference;

    /// A reference to a record's identity
    fn reference_for_record(&self, record: &Record) -> RecordReference {
        self.reference_for(record.identifier())
    }
}

impl StoreReferenceExt for Store {
    fn get_reference(&self, record_type: &str, id: &str) -> RecordReference {
        let identifier = self.identifier_for(record_type, Some(id));
        RecordReference::new(self.clone(), identifier)
    }

    fn reference_for(&self, identifier: &RecordIdentifier) -> RecordReference {
        RecordReference::new(self.clone(), identifier.clone())
    }
}
