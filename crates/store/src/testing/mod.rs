//! Testing utilities for the record store
//!
//! - **MemoryAdapter**: Fixture-backed adapter with latency and failure
//!   injection, counting every request it receives
//!
//! # Example
//!
//! ```ignore
//! use strata_store::testing::MemoryAdapter;
//!
//! let adapter = Arc::new(MemoryAdapter::new().with_latency(Duration::from_millis(20)));
//! adapter.insert(ResourceObject::new("user", Some("1")));
//! let store = Store::new(adapter.clone());
//! ```

mod memory_adapter;

pub use memory_adapter::MemoryAdapter;
