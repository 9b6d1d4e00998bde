//! Process-wide reference-to-identifier cache
//!
//! Each live `RecordReference` owns one slot in a generation-checked arena.
//! The slot stores the reference's identifier; the reference stores only the
//! slot's `ReferenceKey`. The cache never points back at references, so it
//! cannot keep one alive, and releasing a slot drops only the cache's clone of
//! the identifier: the store's identifier and record are untouched.
//!
//! Released slots are recycled through a free list. Every release bumps the
//! slot's generation, so a stale key never resolves to a later occupant.
//!
//! Lookups take a shared read lock; registration and release take the write
//! lock and happen only when a reference is constructed or dropped.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt;
use strata_core::RecordIdentifier;

/// Global cache shared by every reference in the process
static REFERENCE_CACHE: Lazy<ReferenceCache> = Lazy::new(ReferenceCache::new);

/// Handle of a reference's slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReferenceKey {
    slot: u32,
    generation: u32,
}

impl ReferenceKey {
    /// Slot index
    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// Generation of the slot when this key was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref#{}v{}", self.slot, self.generation)
    }
}

struct Slot {
    generation: u32,
    identifier: Option<RecordIdentifier>,
}

#[derive(Default)]
struct Slots {
    entries: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

/// Arena mapping reference keys to identifiers
#[derive(Default)]
pub struct ReferenceCache {
    slots: RwLock<Slots>,
}

impl ReferenceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache
    pub fn global() -> &'static ReferenceCache {
        &REFERENCE_CACHE
    }

    /// Store `identifier` in a free slot and return its key
    pub(crate) fn register(&self, identifier: RecordIdentifier) -> ReferenceKey {
        let mut slots = self.slots.write();
        slots.live += 1;
        if let Some(slot) = slots.free.pop() {
            let entry = &mut slots.entries[slot as usize];
            entry.identifier = Some(identifier);
            return ReferenceKey {
                slot,
                generation: entry.generation,
            };
        }
        let slot = slots.entries.len() as u32;
        slots.entries.push(Slot {
            generation: 0,
            identifier: Some(identifier),
        });
        ReferenceKey {
            slot,
            generation: 0,
        }
    }

    /// The identifier registered under `key`
    ///
    /// `None` if the key was never issued by this cache or has been released.
    pub fn resolve(&self, key: ReferenceKey) -> Option<RecordIdentifier> {
        let slots = self.slots.read();
        slots
            .entries
            .get(key.slot as usize)
            .filter(|entry| entry.generation == key.generation)
            .and_then(|entry| entry.identifier.clone())
    }

    /// Free the slot behind `key`; returns whether it was occupied
    pub(crate) fn release(&self, key: ReferenceKey) -> bool {
        let mut slots = self.slots.write();
        let Some(entry) = slots.entries.get_mut(key.slot as usize) else {
            return false;
        };
        if entry.generation != key.generation || entry.identifier.is_none() {
            return false;
        }
        entry.identifier = None;
        entry.generation = entry.generation.wrapping_add(1);
        slots.free.push(key.slot);
        slots.live -= 1;
        true
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.read().live
    }

    /// Whether no slot is occupied
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total slots allocated, occupied or free
    pub fn capacity(&self) -> usize {
        self.slots.read().entries.len()
    }
}
