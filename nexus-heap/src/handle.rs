//! Generation-tagged handles.

use core::sync::atomic::{AtomicU32, Ordering};

/// A capability to remove one specific occupancy of a heap slot.
///
/// Returned by [`IndexedHeap::insert`](crate::IndexedHeap::insert). A handle
/// stays valid until the element it names leaves the heap by any route
/// (`pop`, `remove`, `clear`, draining). After that it never resolves again,
/// even when its slot is reused by a later insertion.
///
/// Handles are plain `Copy` values. Holding one keeps nothing alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    slot: u32,
    generation: u32,
    owner: u32,
}

impl Handle {
    #[inline]
    pub(crate) const fn new(slot: u32, generation: u32, owner: u32) -> Self {
        Self {
            slot,
            generation,
            owner,
        }
    }

    /// Slot id this handle names.
    #[inline]
    pub const fn slot(&self) -> u32 {
        self.slot
    }

    /// Generation of the slot when the handle was issued.
    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Id of the heap that issued the handle.
    #[inline]
    pub const fn owner(&self) -> u32 {
        self.owner
    }
}

static NEXT_OWNER: AtomicU32 = AtomicU32::new(1);

/// Process-unique id for a new heap instance.
#[inline]
pub(crate) fn next_owner_id() -> u32 {
    NEXT_OWNER.fetch_add(1, Ordering::Relaxed)
}
