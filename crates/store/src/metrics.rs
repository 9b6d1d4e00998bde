//! Store counters
//!
//! Counters use Relaxed ordering: they are observational only and
//! synchronize nothing else.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub(crate) struct StoreCounters {
    pushes: AtomicU64,
    fetches_started: AtomicU64,
    fetches_joined: AtomicU64,
    fetches_failed: AtomicU64,
}

impl StoreCounters {
    pub(crate) fn record_push(&self) {
        self.pushes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fetch_started(&self) {
        self.fetches_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fetch_joined(&self) {
        self.fetches_joined.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fetch_failed(&self) {
        self.fetches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StoreMetrics {
        StoreMetrics {
            pushes: self.pushes.load(Ordering::Relaxed),
            fetches_started: self.fetches_started.load(Ordering::Relaxed),
            fetches_joined: self.fetches_joined.load(Ordering::Relaxed),
            fetches_failed: self.fetches_failed.load(Ordering::Relaxed),
        }
    }
}

/// Store metrics
///
/// Point-in-time copy of the store's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreMetrics {
    /// Documents normalized through `push`
    pub pushes: u64,
    /// Adapter fetches issued
    pub fetches_started: u64,
    /// Fetch requests that joined an in-flight fetch instead of issuing one
    pub fetches_joined: u64,
    /// Adapter fetches that failed
    pub fetches_failed: u64,
}

impl StoreMetrics {
    /// Fraction of fetch requests served by an in-flight fetch
    pub fn dedup_rate(&self) -> f64 {
        let requested = self.fetches_started + self.fetches_joined;
        if requested > 0 {
            self.fetches_joined as f64 / requested as f64
        } else {
            0.0
        }
    }
}
