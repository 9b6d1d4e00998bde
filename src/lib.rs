//! Strata records - stable references over an identity-mapped record store
//!
//! A [`RecordReference`] is a cheap handle for one `(type, id)` identity. It
//! reads through a [`Store`], which owns the identity map: one identifier per
//! identity, one [`Record`] instance per identifier, and a load state for each.
//!
//! # Quick Start
//!
//! ```ignore
//! use strata_records::{Reference, Store, StoreReferenceExt};
//! use strata_records::testing::MemoryAdapter;
//!
//! let store = Store::new(Arc::new(MemoryAdapter::new()));
//! let user = store.get_reference("user", "1");
//!
//! assert!(user.value().is_none());
//! let record = user.load()?.await?;
//! assert_eq!(user.value(), Some(record));
//! ```
//!
//! # Architecture
//!
//! - `strata-core`: identifiers, documents, errors
//! - `strata-store`: the identity map, load states, adapter fetches
//! - `strata-reference`: references and the process-wide reference cache

pub use strata_core::{
    RecordIdentifier, RemoteType, ResourceObject, SingleResourceDocument, StrataError,
    StrataResult,
};
pub use strata_reference::{
    RecordReference, Reference, ReferenceCache, ReferenceKey, StoreReferenceExt,
};
pub use strata_store::testing;
pub use strata_store::{
    Adapter, FetchRequest, FindOptions, LoadState, Record, Store, StoreConfig, StoreMetrics,
    CONFIG_FILE_NAME,
};
