//! Record references for Strata
//!
//! A reference is an identity-scoped handle for meta-operations on a record
//! that may or may not be loaded:
//! - Reference: Identity contract shared by every reference variant
//! - RecordReference: The `(type, id)` identity variant (`RemoteType::Identity`)
//! - ReferenceCache: Process-wide, generation-checked reference → identifier map
//! - StoreReferenceExt: Obtaining references from a `Store`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod ext;
pub mod reference;

pub use cache::{ReferenceCache, ReferenceKey};
pub use ext::StoreReferenceExt;
pub use reference::{RecordReference, Reference};
