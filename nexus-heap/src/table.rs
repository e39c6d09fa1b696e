//! Backing tables: the heap array and the slot table.
//!
//! Both tables always have the same length (the heap's capacity). Each heap
//! cell carries a slot id and the cells' slot ids form a permutation of
//! `0..capacity`, live or not, so for every cell `i`:
//!
//! ```text
//! slots[entries[i].slot].pos == i
//! ```
//!
//! Only the first `len` cells (tracked by the heap) hold an initialized item.

use core::mem::MaybeUninit;
use core::ptr;
use core::slice;

use crate::alloc::{AllocError, Allocator, RawBuf};
use crate::error::{ConfigError, HandleError};
use crate::handle::Handle;

/// Largest capacity: slot ids and positions are stored as `u32`.
pub(crate) const MAX_CAPACITY: usize = u32::MAX as usize;

/// Generation assigned to slots created before any shrink.
pub(crate) const INITIAL_GENERATION: u32 = 1;

/// A heap array cell.
pub(crate) struct Entry<T> {
    pub(crate) item: MaybeUninit<T>,
    pub(crate) slot: u32,
}

/// A slot table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub(crate) pos: u32,
    pub(crate) generation: u32,
}

impl Slot {
    /// Ends the current occupancy, invalidating its handle.
    #[inline]
    pub(crate) fn retire(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Validates a capacity for construction or resizing.
pub(crate) fn check_capacity<T>(capacity: usize) -> Result<(), ConfigError> {
    if capacity == 0 {
        return Err(ConfigError::ZeroCapacity);
    }
    if capacity > MAX_CAPACITY {
        return Err(ConfigError::CapacityOverflow);
    }
    RawBuf::<Entry<T>>::layout(capacity)?;
    RawBuf::<Slot>::layout(capacity)?;
    Ok(())
}

pub(crate) struct Tables<T, A: Allocator> {
    entries: RawBuf<Entry<T>>,
    slots: RawBuf<Slot>,
    /// Logical capacity. Both buffers hold at least this many elements.
    cap: usize,
    /// Starting generation for slots created from now on.
    fresh: u32,
    alloc: A,
}

impl<T, A: Allocator> Tables<T, A> {
    /// Allocates both tables with identity slot ids.
    pub(crate) fn new(alloc: A, cap: usize) -> Result<Self, ConfigError> {
        check_capacity::<T>(cap)?;

        let mut entries =
            RawBuf::allocate(&alloc, cap).map_err(|_| ConfigError::AllocationFailed)?;
        let slots = match RawBuf::allocate(&alloc, cap) {
            Ok(slots) => slots,
            Err(_) => {
                // Safety: entries came from `alloc` and is dropped right after.
                unsafe { entries.release(&alloc) };
                return Err(ConfigError::AllocationFailed);
            }
        };

        let mut tables = Self {
            entries,
            slots,
            cap: 0,
            fresh: INITIAL_GENERATION,
            alloc,
        };
        tables.init_range(0, cap);
        Ok(tables)
    }

    #[inline]
    pub(crate) const fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    /// All `capacity` heap cells.
    #[inline]
    pub(crate) fn entries(&self) -> &[Entry<T>] {
        // Safety: slot ids of cells below cap are initialized, items are
        // MaybeUninit.
        unsafe { slice::from_raw_parts(self.entries.as_ptr(), self.cap) }
    }

    #[inline]
    pub(crate) fn slots(&self) -> &[Slot] {
        // Safety: every slot below cap is initialized.
        unsafe { slice::from_raw_parts(self.slots.as_ptr(), self.cap) }
    }

    /// Both tables, mutably.
    #[inline]
    pub(crate) fn split_mut(&mut self) -> (&mut [Entry<T>], &mut [Slot]) {
        // Safety: as in `entries` and `slots`. The buffers never alias.
        unsafe {
            (
                slice::from_raw_parts_mut(self.entries.as_ptr(), self.cap),
                slice::from_raw_parts_mut(self.slots.as_ptr(), self.cap),
            )
        }
    }

    /// Resolves a handle already checked for ownership to its heap position.
    #[inline]
    pub(crate) fn resolve(&self, handle: Handle) -> Result<usize, HandleError> {
        let slot = self
            .slots()
            .get(handle.slot() as usize)
            .ok_or(HandleError::OutOfRange)?;
        if slot.generation != handle.generation() {
            return Err(HandleError::AlreadyRemoved);
        }
        Ok(slot.pos as usize)
    }

    /// Grows both tables to `new_cap` (> capacity, already validated).
    ///
    /// On failure the logical capacity is unchanged; a buffer that did grow
    /// simply keeps its extra room.
    pub(crate) fn grow(&mut self, new_cap: usize) -> Result<(), AllocError> {
        debug_assert!(new_cap > self.cap && new_cap <= MAX_CAPACITY);
        let old_cap = self.cap;

        if self.entries.cap() < new_cap {
            self.entries.reallocate(&self.alloc, new_cap)?;
        }
        if self.slots.cap() < new_cap {
            self.slots.reallocate(&self.alloc, new_cap)?;
        }
        self.init_range(old_cap, new_cap);

        tracing::trace!(
            target: "nexus_heap::resize",
            from = old_cap,
            to = new_cap,
            "heap tables grown"
        );
        Ok(())
    }

    /// Shrinks both tables to `new_cap`.
    ///
    /// Caller guarantees `len <= new_cap < capacity` and that every live cell
    /// (`0..len`) holds a slot id below `new_cap`.
    pub(crate) fn shrink(&mut self, len: usize, new_cap: usize) {
        debug_assert!(len <= new_cap && new_cap < self.cap && new_cap > 0);
        let old_cap = self.cap;
        let mut fresh = self.fresh;
        let (entries, slots) = self.split_mut();

        // Compact the dead cells so `len..new_cap` hold exactly the free slot
        // ids below `new_cap`. Items never move.
        let mut write = len;
        for read in len..old_cap {
            let slot = entries[read].slot;
            if (slot as usize) < new_cap {
                entries[write].slot = slot;
                slots[slot as usize].pos = write as u32;
                write += 1;
            }
        }
        debug_assert_eq!(write, new_cap);

        // A dropped slot may come back on regrowth. Start it past every
        // generation a stale handle to it could carry.
        for slot in &slots[new_cap..old_cap] {
            fresh = fresh.max(slot.generation);
        }
        self.fresh = fresh;
        self.cap = new_cap;

        // Failing to return memory is harmless: buffers may exceed `cap`.
        if let Err(err) = self.entries.reallocate(&self.alloc, new_cap) {
            tracing::warn!(target: "nexus_heap::resize", %err, "heap array kept its old buffer");
        }
        if let Err(err) = self.slots.reallocate(&self.alloc, new_cap) {
            tracing::warn!(target: "nexus_heap::resize", %err, "slot table kept its old buffer");
        }

        tracing::trace!(
            target: "nexus_heap::resize",
            from = old_cap,
            to = new_cap,
            fresh_generation = fresh,
            "heap tables shrunk"
        );
    }

    /// Initializes cells and slots `from..to` with identity slot ids and
    /// extends the logical capacity to `to`.
    fn init_range(&mut self, from: usize, to: usize) {
        debug_assert!(self.entries.cap() >= to && self.slots.cap() >= to);
        let entries = self.entries.as_ptr();
        let slots = self.slots.as_ptr();
        for i in from..to {
            // Safety: i < buffer capacities. Only the slot field of the
            // entry is written; the item stays uninitialized.
            unsafe {
                ptr::addr_of_mut!((*entries.add(i)).slot).write(i as u32);
                slots.add(i).write(Slot {
                    pos: i as u32,
                    generation: self.fresh,
                });
            }
        }
        self.cap = to;
    }
}

impl<T, A: Allocator> Drop for Tables<T, A> {
    fn drop(&mut self) {
        // Items are dropped by the heap. Only the blocks are released here.
        unsafe {
            self.entries.release(&self.alloc);
            self.slots.release(&self.alloc);
        }
    }
}
