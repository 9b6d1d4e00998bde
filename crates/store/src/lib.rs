//! Record store for Strata
//!
//! This crate owns the identity map that record references read through:
//! - Store: Identifier cache, record instances, load states, fetch de-duplication
//! - Record: Materialized record instance shared by every reader of an identity
//! - LoadState: Per-identity state machine
//! - Adapter: Seam to the remote source of record documents
//! - StoreConfig: `strata.toml` configuration
//!
//! Reads (`peek_record`, `load_state`) are synchronous. `find_record` is async
//! and needs a Tokio runtime; concurrent finds of one identity share one
//! adapter fetch.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod config;
mod identifiers;
mod inflight;
pub mod metrics;
pub mod record;
pub mod state;
pub mod store;
pub mod testing;

pub use adapter::{Adapter, FetchRequest, FindOptions};
pub use config::{StoreConfig, CONFIG_FILE_NAME};
pub use metrics::StoreMetrics;
pub use record::Record;
pub use state::LoadState;
pub use store::Store;
