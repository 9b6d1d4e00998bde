//! Adapter seam between the store and a remote source
//!
//! The store never talks to a network itself. A `find_record` that needs data
//! asks its `Adapter` for a single-resource document and normalizes the result
//! through the same path as `Store::push`.

use async_trait::async_trait;
use strata_core::{RecordIdentifier, SingleResourceDocument, StrataResult};

/// Options for `Store::find_record`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Bypass loaded data and in-flight requests; always fetch anew
    pub reload: bool,
}

impl FindOptions {
    /// Options forcing a fresh fetch
    pub fn reload() -> Self {
        Self { reload: true }
    }
}

/// One adapter fetch
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Identity to fetch; always carries a remote id
    pub identifier: RecordIdentifier,
    /// Whether the caller forced a reload
    pub reload: bool,
}

impl FetchRequest {
    /// The record type
    pub fn record_type(&self) -> &str {
        self.identifier.record_type()
    }

    /// The remote id
    pub fn id(&self) -> &str {
        self.identifier.id().unwrap_or_default()
    }
}

/// Source of record documents
///
/// Implementations report a missing record as `StrataError::NotFound` and
/// transport failures as `StrataError::Adapter`. Whatever they return reaches
/// callers unmodified.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str {
        "adapter"
    }

    /// Fetch the document for one record
    async fn find_record(&self, request: &FetchRequest) -> StrataResult<SingleResourceDocument>;
}
