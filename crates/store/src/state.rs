//! Per-identity load state
//!
//! ## State Machine
//!
//! ```text
//!              load                 success
//! NotLoaded ─────────► Loading ───────────────┐
//!     ▲                   │ failure           ▼
//!     └───────────────────┘                 Loaded ◄──── push (from any state)
//!                                          │    ▲
//!                                   reload │    │ success / failure
//!                                          ▼    │
//!                                        Reloading
//! ```
//!
//! `Unresolved` is reported for every identifier without a remote id,
//! regardless of what the store holds for it.

use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Observable load state of a record identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// The identifier has no remote id yet
    Unresolved,
    /// Nothing loaded, nothing in flight
    NotLoaded,
    /// First fetch in flight
    Loading,
    /// Record data available
    Loaded,
    /// Forced re-fetch in flight over loaded data
    Reloading,
}

impl LoadState {
    /// Whether a fetch is in flight
    pub fn is_fetching(&self) -> bool {
        matches!(self, LoadState::Loading | LoadState::Reloading)
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadState::Unresolved => "unresolved",
            LoadState::NotLoaded => "not_loaded",
            LoadState::Loading => "loading",
            LoadState::Loaded => "loaded",
            LoadState::Reloading => "reloading",
        };
        f.write_str(name)
    }
}

/// What the identity map holds for one identity
#[derive(Debug, Clone)]
pub(crate) struct RecordEntry {
    pub(crate) state: LoadState,
    pub(crate) record: Option<Record>,
    /// Adapter fetches currently outstanding for this identity
    pub(crate) fetches: u32,
    /// Sequence number of the last fetch started
    started: u64,
    /// Highest sequence number whose data has been merged
    applied: u64,
}

impl RecordEntry {
    pub(crate) fn empty() -> Self {
        Self {
            state: LoadState::NotLoaded,
            record: None,
            fetches: 0,
            started: 0,
            applied: 0,
        }
    }

    /// Transition for a fetch that is about to start; returns its sequence number
    pub(crate) fn begin_fetch(&mut self) -> u64 {
        self.fetches += 1;
        self.started += 1;
        self.state = if self.record.is_some() {
            LoadState::Reloading
        } else {
            LoadState::Loading
        };
        self.started
    }

    /// Whether data from a later-started fetch has already been merged
    pub(crate) fn is_superseded(&self, seq: u64) -> bool {
        seq < self.applied
    }

    /// Transition for fetch `seq` settling with `record`
    pub(crate) fn complete_fetch(&mut self, seq: u64, record: Record) {
        self.fetches = self.fetches.saturating_sub(1);
        self.applied = self.applied.max(seq);
        self.record = Some(record);
        self.state = if self.fetches == 0 {
            LoadState::Loaded
        } else {
            LoadState::Reloading
        };
    }

    /// Transition for a fetch that failed
    ///
    /// Loaded data survives a failed reload, and so does data pushed while
    /// the fetch was in flight.
    pub(crate) fn fail_fetch(&mut self) {
        self.fetches = self.fetches.saturating_sub(1);
        if self.fetches > 0 {
            return;
        }
        self.state = if self.record.is_some() {
            LoadState::Loaded
        } else {
            LoadState::NotLoaded
        };
    }

    /// Transition for pushed data
    pub(crate) fn complete_push(&mut self, record: Record) {
        self.record = Some(record);
        self.state = LoadState::Loaded;
    }

    /// Drop record data, keeping any in-flight fetch accounted for
    pub(crate) fn unload(&mut self) {
        self.record = None;
        self.state = if self.fetches > 0 {
            LoadState::Loading
        } else {
            LoadState::NotLoaded
        };
    }

    /// The loaded record, if the entry is `Loaded`
    pub(crate) fn loaded(&self) -> Option<&Record> {
        match self.state {
            LoadState::Loaded => self.record.as_ref(),
            _ => None,
        }
    }
}
