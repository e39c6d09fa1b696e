//! Binary heap with generation-tagged handles for O(log n) arbitrary removal.
//!
//! Elements live in a dense heap array. Every cell carries a stable slot id,
//! and a slot table maps slot ids back to heap positions, so a [`Handle`]
//! finds its element in O(1) no matter how often the heap has rebalanced.

use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::mem::{self, ManuallyDrop};
use core::ptr;
use core::slice;
use std::alloc::handle_alloc_error;

use crate::alloc::{Allocator, Global};
use crate::compare::{Compare, MinOrder};
use crate::error::{ConfigError, HandleError, HeapError};
use crate::handle::{Handle, next_owner_id};
use crate::table::{Entry, MAX_CAPACITY, Slot, Tables, check_capacity};

/// A priority queue supporting removal of any element by handle.
///
/// The element that compares least under `C` is at the top, so the default
/// [`MinOrder`] makes this a min-heap.
///
/// | Operation | Cost |
/// |-----------|------|
/// | [`insert`](Self::insert) | O(log n), amortized growth |
/// | [`peek`](Self::peek) | O(1) |
/// | [`pop`](Self::pop) | O(log n) |
/// | [`remove`](Self::remove) | O(log n) |
/// | [`update`](Self::update) | O(log n) |
/// | [`clear`](Self::clear) | O(n) |
///
/// # Example
///
/// ```
/// use nexus_heap::{HandleError, HeapError, IndexedHeap};
///
/// let mut heap = IndexedHeap::with_capacity(4).unwrap();
/// heap.insert(5);
/// heap.insert(3);
/// heap.insert(10);
/// let seven = heap.insert(7);
///
/// assert_eq!(heap.pop(), Ok(3));
/// assert_eq!(heap.remove(seven), Ok(7));
/// assert_eq!(
///     heap.remove(seven),
///     Err(HeapError::InvalidHandle(HandleError::AlreadyRemoved))
/// );
/// assert_eq!(heap.pop(), Ok(5));
/// assert_eq!(heap.pop(), Ok(10));
/// assert_eq!(heap.pop(), Err(HeapError::Empty));
/// ```
pub struct IndexedHeap<T, C = MinOrder, A: Allocator = Global> {
    tables: Tables<T, A>,
    len: usize,
    owner: u32,
    compare: C,
    _marker: PhantomData<T>,
}

impl<T> IndexedHeap<T>
where
    MinOrder: Compare<T>,
{
    /// Creates a min-heap with room for `capacity` elements.
    ///
    /// # Errors
    ///
    /// [`HeapError::InvalidConfiguration`] if `capacity` is zero, too large,
    /// or cannot be allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self, HeapError> {
        Self::with_comparator_in(capacity, MinOrder, Global)
    }
}

impl<T, C: Compare<T>> IndexedHeap<T, C> {
    /// Creates a heap ordered by `compare`.
    ///
    /// # Errors
    ///
    /// Same as [`with_capacity`](IndexedHeap::with_capacity).
    pub fn with_comparator(capacity: usize, compare: C) -> Result<Self, HeapError> {
        Self::with_comparator_in(capacity, compare, Global)
    }
}

impl<T, C, A: Allocator> IndexedHeap<T, C, A> {
    /// Creates a heap ordered by `compare` whose tables come from `alloc`.
    ///
    /// # Errors
    ///
    /// Same as [`with_capacity`](IndexedHeap::with_capacity).
    pub fn with_comparator_in(capacity: usize, compare: C, alloc: A) -> Result<Self, HeapError> {
        let tables = Tables::new(alloc, capacity)?;
        Ok(Self {
            tables,
            len: 0,
            owner: next_owner_id(),
            compare,
            _marker: PhantomData,
        })
    }

    /// Returns the number of elements in the heap.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the heap is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the heap holds before growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.tables.capacity()
    }

    /// Returns the ordering policy.
    #[inline]
    pub fn comparator(&self) -> &C {
        &self.compare
    }

    /// Returns the allocator backing the tables.
    #[inline]
    pub fn allocator(&self) -> &A {
        self.tables.allocator()
    }

    /// Returns the top element, or `None` if empty.
    #[inline]
    pub fn try_peek(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        // Safety: cell 0 is live.
        Some(unsafe { self.item(0) })
    }

    /// Returns the top element.
    ///
    /// # Errors
    ///
    /// [`HeapError::Empty`] if the heap has no elements.
    #[inline]
    pub fn peek(&self) -> Result<&T, HeapError> {
        self.try_peek().ok_or(HeapError::Empty)
    }

    /// Returns `true` if `handle` names an element currently in this heap.
    #[inline]
    pub fn is_valid(&self, handle: Handle) -> bool {
        self.resolve(handle).is_ok()
    }

    /// Checks `handle`, reporting why it does not resolve.
    ///
    /// Checks run in order: owner, slot range, generation.
    #[inline]
    pub fn validate(&self, handle: Handle) -> Result<(), HandleError> {
        self.resolve(handle).map(|_| ())
    }

    /// Returns the element named by `handle`, if it is still in the heap.
    #[inline]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        let pos = self.resolve(handle).ok()?;
        // Safety: a resolved handle points at a live cell.
        Some(unsafe { self.item(pos) })
    }

    /// Returns `true` if the element named by `handle` is still in the heap.
    ///
    /// Same check as [`is_valid`](Self::is_valid).
    #[inline]
    pub fn contains(&self, handle: Handle) -> bool {
        self.is_valid(handle)
    }

    /// Iterates over the elements in heap (array) order.
    ///
    /// Only the first element is guaranteed to be the top; the rest follow the
    /// tree layout.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.tables.entries()[..self.len].iter(),
        }
    }

    /// Removes every element, invalidating all outstanding handles.
    ///
    /// Capacity is retained.
    pub fn clear(&mut self) {
        let len = mem::replace(&mut self.len, 0);
        if len == 0 {
            return;
        }

        let (entries, slots) = self.tables.split_mut();
        for entry in &entries[..len] {
            slots[entry.slot as usize].retire();
        }

        tracing::trace!(target: "nexus_heap::clear", dropped = len, "heap cleared");

        if mem::needs_drop::<T>() {
            for entry in &mut entries[..len] {
                // Safety: cells below the old len were live. len is already 0,
                // so a panicking drop leaks the rest rather than double dropping.
                unsafe { entry.item.assume_init_drop() };
            }
        }
    }

    /// Replaces the ordering policy.
    ///
    /// # Errors
    ///
    /// [`HeapError::NotEmpty`] unless the heap is empty: a new order would
    /// silently break the heap property.
    pub fn set_comparator(&mut self, compare: C) -> Result<(), HeapError> {
        if self.len != 0 {
            return Err(HeapError::NotEmpty);
        }
        self.compare = compare;
        tracing::trace!(target: "nexus_heap::comparator", "comparator replaced");
        Ok(())
    }

    /// Resizes the tables to exactly `capacity` elements.
    ///
    /// Live elements keep their handles, positions, and generations.
    ///
    /// # Errors
    ///
    /// - [`HeapError::CapacityTooSmall`] if `capacity` is below the element
    ///   count, or below the highest slot id still in use. Live handles carry
    ///   their slot id, so it cannot be renumbered.
    /// - [`HeapError::InvalidConfiguration`] for a zero or oversized capacity,
    ///   or if growth cannot be allocated.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), HeapError> {
        if capacity < self.len {
            return Err(HeapError::CapacityTooSmall {
                requested: capacity,
                required: self.min_capacity(),
            });
        }
        check_capacity::<T>(capacity)?;

        let current = self.capacity();
        if capacity > current {
            self.tables
                .grow(capacity)
                .map_err(|_| ConfigError::AllocationFailed)?;
        } else if capacity < current {
            let required = self.min_capacity();
            if capacity < required {
                return Err(HeapError::CapacityTooSmall {
                    requested: capacity,
                    required,
                });
            }
            self.tables.shrink(self.len, capacity);
        }
        Ok(())
    }

    /// Shrinks the tables as far as the live elements allow.
    pub fn shrink_to_fit(&mut self) {
        let target = self.min_capacity();
        if target < self.capacity() {
            self.tables.shrink(self.len, target);
        }
    }

    /// Smallest capacity that keeps every live element and slot id.
    fn min_capacity(&self) -> usize {
        let highest = self.tables.entries()[..self.len]
            .iter()
            .map(|entry| entry.slot as usize + 1)
            .max()
            .unwrap_or(0);
        highest.max(self.len).max(1)
    }

    /// Checks ownership, range, and generation; returns the heap position.
    #[inline]
    fn resolve(&self, handle: Handle) -> Result<usize, HandleError> {
        if handle.owner() != self.owner {
            return Err(HandleError::WrongOwner);
        }
        self.tables.resolve(handle)
    }

    /// # Safety
    ///
    /// `pos < len`.
    #[inline]
    unsafe fn item(&self, pos: usize) -> &T {
        debug_assert!(pos < self.len);
        unsafe { self.tables.entries().get_unchecked(pos).item.assume_init_ref() }
    }

    /// Live cells, slot table, and comparator, borrowed together.
    #[inline]
    fn parts(&mut self) -> (&mut [Entry<T>], &mut [Slot], &C) {
        let (entries, slots) = self.tables.split_mut();
        (&mut entries[..self.len], slots, &self.compare)
    }

    /// Moves the item at `pos` out, retiring its slot.
    ///
    /// The last live cell takes over `pos` and the retired slot id takes over
    /// the vacated last cell. The caller restores order at `pos`.
    ///
    /// # Safety
    ///
    /// `pos < len`.
    unsafe fn take_at(&mut self, pos: usize) -> T {
        debug_assert!(pos < self.len);
        let last = self.len - 1;
        let (entries, slots) = self.tables.split_mut();

        let removed = entries[pos].slot;
        // Safety: pos is live; the cell is treated as vacated from here on.
        let item = unsafe { entries[pos].item.assume_init_read() };
        slots[removed as usize].retire();

        if pos != last {
            // Safety: pos != last, both < cap.
            unsafe {
                let base = entries.as_mut_ptr();
                ptr::copy_nonoverlapping(base.add(last), base.add(pos), 1);
            }
            let moved = entries[pos].slot;
            slots[moved as usize].pos = pos as u32;
            entries[last].slot = removed;
            slots[removed as usize].pos = last as u32;
        }

        self.len = last;
        item
    }

    #[cold]
    fn grow(&mut self) {
        let cap = self.capacity();
        assert!(cap < MAX_CAPACITY, "capacity overflow");
        let new_cap = cap.saturating_mul(2).min(MAX_CAPACITY);
        // Panics like Vec if the layout itself overflows.
        if let Err(err) = check_capacity::<T>(new_cap) {
            panic!("{err}");
        }
        if let Err(err) = self.tables.grow(new_cap) {
            handle_alloc_error(err.layout());
        }
    }
}

impl<T, C: Compare<T>, A: Allocator> IndexedHeap<T, C, A> {
    /// Pushes an element, returning the handle that can remove it later.
    ///
    /// Doubles the capacity when full.
    ///
    /// # Panics
    ///
    /// Panics if the capacity would exceed `u32::MAX` elements. Aborts via
    /// [`handle_alloc_error`] if growth cannot be allocated.
    pub fn insert(&mut self, item: T) -> Handle {
        if self.len == self.capacity() {
            self.grow();
        }

        let pos = self.len;
        let (entries, slots) = self.tables.split_mut();
        let entry = &mut entries[pos];
        entry.item.write(item);
        let slot = entry.slot;
        let generation = slots[slot as usize].generation;
        self.len += 1;

        // Safety: pos < len.
        unsafe { self.sift_up(0, pos) };
        Handle::new(slot, generation, self.owner)
    }

    /// Removes and returns the top element, or `None` if empty.
    pub fn try_pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        // Safety: 0 < len.
        let item = unsafe { self.take_at(0) };
        if self.len > 0 {
            // Safety: 0 < len.
            unsafe { self.sift_down_to_bottom(0) };
        }
        Some(item)
    }

    /// Removes and returns the top element.
    ///
    /// # Errors
    ///
    /// [`HeapError::Empty`] if the heap has no elements.
    #[inline]
    pub fn pop(&mut self) -> Result<T, HeapError> {
        self.try_pop().ok_or(HeapError::Empty)
    }

    /// Removes the element named by `handle`.
    ///
    /// The handle, and any copy of it, is dead afterwards.
    ///
    /// # Errors
    ///
    /// [`HeapError::InvalidHandle`] if the handle belongs to another heap,
    /// names a slot beyond capacity, or its element is already gone.
    pub fn remove(&mut self, handle: Handle) -> Result<T, HeapError> {
        let pos = self.resolve(handle)?;
        // Safety: resolved positions are live.
        Ok(unsafe { self.remove_at(pos) })
    }

    /// Removes the element named by `handle` without validating it.
    ///
    /// Validation still runs as a debug assertion.
    ///
    /// # Safety
    ///
    /// `handle` must be valid for this heap (see [`is_valid`](Self::is_valid)).
    pub unsafe fn remove_unchecked(&mut self, handle: Handle) -> T {
        debug_assert!(self.is_valid(handle), "invalid handle: {handle:?}");
        let pos = self.tables.slots()[handle.slot() as usize].pos as usize;
        unsafe { self.remove_at(pos) }
    }

    /// Mutates the element named by `handle` in place, then restores order.
    ///
    /// The handle stays valid. This is how priorities are raised or lowered.
    ///
    /// # Errors
    ///
    /// [`HeapError::InvalidHandle`] as for [`remove`](Self::remove); `f` is
    /// not called.
    ///
    /// # Example
    ///
    /// ```
    /// use nexus_heap::IndexedHeap;
    ///
    /// let mut heap = IndexedHeap::with_capacity(8).unwrap();
    /// heap.insert(10);
    /// let h = heap.insert(20);
    ///
    /// heap.update(h, |v| *v = 1).unwrap();
    /// assert_eq!(heap.peek(), Ok(&1));
    /// assert_eq!(heap.get(h), Some(&1));
    /// ```
    pub fn update<F>(&mut self, handle: Handle, f: F) -> Result<(), HeapError>
    where
        F: FnOnce(&mut T),
    {
        let pos = self.resolve(handle)?;
        let (entries, _) = self.tables.split_mut();
        // Safety: resolved positions are live.
        f(unsafe { entries[pos].item.assume_init_mut() });
        // Safety: pos < len.
        unsafe { self.restore(pos) };
        Ok(())
    }

    /// Pops elements while `pred` holds for the current top.
    ///
    /// Elements come out in order. Whatever is not consumed stays in the heap.
    ///
    /// ```
    /// use nexus_heap::IndexedHeap;
    ///
    /// let mut heap = IndexedHeap::with_capacity(8).unwrap();
    /// for v in [1, 5, 3, 7] {
    ///     heap.insert(v);
    /// }
    /// let due: Vec<_> = heap.drain_while(|&v| v < 4).collect();
    /// assert_eq!(due, vec![1, 3]);
    /// assert_eq!(heap.peek(), Ok(&5));
    /// ```
    #[inline]
    pub fn drain_while<F>(&mut self, pred: F) -> DrainWhile<'_, T, C, A, F>
    where
        F: FnMut(&T) -> bool,
    {
        DrainWhile { heap: self, pred }
    }

    /// Consumes the heap, returning its elements in extraction order.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len);
        while let Some(item) = self.try_pop() {
            out.push(item);
        }
        out
    }

    /// # Safety
    ///
    /// `pos < len`.
    unsafe fn remove_at(&mut self, pos: usize) -> T {
        let item = unsafe { self.take_at(pos) };
        if pos < self.len {
            unsafe { self.restore(pos) };
        }
        item
    }

    /// Restores order around `pos` after its element changed or was replaced.
    ///
    /// The element can only be out of place in one direction.
    ///
    /// # Safety
    ///
    /// `pos < len`.
    unsafe fn restore(&mut self, pos: usize) {
        if pos > 0 {
            let parent = (pos - 1) / 2;
            let precedes_parent = unsafe {
                self.compare.compare(self.item(pos), self.item(parent)) == Ordering::Less
            };
            if precedes_parent {
                unsafe { self.sift_up(0, pos) };
                return;
            }
        }
        unsafe { self.sift_down_range(pos) };
    }

    /// Moves the element at `pos` toward `start` while it precedes its parent.
    ///
    /// # Safety
    ///
    /// `start <= pos < len`.
    unsafe fn sift_up(&mut self, start: usize, pos: usize) -> usize {
        let (entries, slots, compare) = self.parts();
        let mut hole = unsafe { Hole::new(entries, slots, pos) };

        while hole.pos() > start {
            let parent = (hole.pos() - 1) / 2;
            // Safety: parent < hole.pos() < len.
            if compare.compare(hole.element(), unsafe { hole.get(parent) }) != Ordering::Less {
                break;
            }
            unsafe { hole.move_to(parent) };
        }

        hole.pos()
    }

    /// Moves the element at `pos` down while a child precedes it.
    ///
    /// # Safety
    ///
    /// `pos < len`.
    unsafe fn sift_down_range(&mut self, pos: usize) {
        let end = self.len;
        let (entries, slots, compare) = self.parts();
        let mut hole = unsafe { Hole::new(entries, slots, pos) };
        let mut child = 2 * hole.pos() + 1;

        // Both children in range.
        while child <= end.saturating_sub(2) {
            // Safety: child + 1 < end, neither is the hole.
            let right_first = unsafe {
                compare.compare(hole.get(child + 1), hole.get(child)) == Ordering::Less
            };
            child += right_first as usize;

            if compare.compare(hole.element(), unsafe { hole.get(child) }) != Ordering::Greater {
                return;
            }
            unsafe { hole.move_to(child) };
            child = 2 * hole.pos() + 1;
        }

        // Single left child at the end.
        if child == end - 1
            && compare.compare(hole.element(), unsafe { hole.get(child) }) == Ordering::Greater
        {
            unsafe { hole.move_to(child) };
        }
    }

    /// Pop's rebalance: the element at `pos` came from the bottom, so descend
    /// along the preferred child all the way down, then sift back up.
    ///
    /// # Safety
    ///
    /// `pos < len`.
    unsafe fn sift_down_to_bottom(&mut self, pos: usize) {
        let end = self.len;
        let start = pos;
        let (entries, slots, compare) = self.parts();
        let mut hole = unsafe { Hole::new(entries, slots, pos) };
        let mut child = 2 * hole.pos() + 1;

        // Phase 1: descend to a leaf.
        while child <= end.saturating_sub(2) {
            let right_first = unsafe {
                compare.compare(hole.get(child + 1), hole.get(child)) == Ordering::Less
            };
            child += right_first as usize;
            unsafe { hole.move_to(child) };
            child = 2 * hole.pos() + 1;
        }
        if child == end - 1 {
            unsafe { hole.move_to(child) };
        }

        // Phase 2: sift up from the leaf.
        let pos = hole.pos();
        drop(hole);
        unsafe { self.sift_up(start, pos) };
    }
}

impl<T, C, A: Allocator> Drop for IndexedHeap<T, C, A> {
    fn drop(&mut self) {
        let len = mem::replace(&mut self.len, 0);
        if mem::needs_drop::<T>() {
            let (entries, _) = self.tables.split_mut();
            for entry in &mut entries[..len] {
                // Safety: cells below len are live.
                unsafe { entry.item.assume_init_drop() };
            }
        }
        // Tables release both buffers on their own drop, even if an item
        // drop above panicked.
    }
}

impl<T: fmt::Debug, C, A: Allocator> fmt::Debug for IndexedHeap<T, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedHeap")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("items", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a, T, C, A: Allocator> IntoIterator for &'a IndexedHeap<T, C, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over heap elements in array order.
///
/// Created by [`IndexedHeap::iter`].
pub struct Iter<'a, T> {
    inner: slice::Iter<'a, Entry<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        // Safety: the iterator only spans live cells.
        self.inner
            .next()
            .map(|entry| unsafe { entry.item.assume_init_ref() })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Pops elements while a predicate holds.
///
/// Created by [`IndexedHeap::drain_while`].
pub struct DrainWhile<'a, T, C, A: Allocator, F>
where
    F: FnMut(&T) -> bool,
{
    heap: &'a mut IndexedHeap<T, C, A>,
    pred: F,
}

impl<T, C: Compare<T>, A: Allocator, F> Iterator for DrainWhile<'_, T, C, A, F>
where
    F: FnMut(&T) -> bool,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let top = self.heap.try_peek()?;
        if (self.pred)(top) {
            self.heap.try_pop()
        } else {
            None
        }
    }
}

// =============================================================================
// Hole
// =============================================================================

/// An element held out of the heap array while it is sifted.
///
/// Neighbours shift into the hole as it moves, updating their slot table
/// positions. Dropping the hole writes the element and its slot id back at the
/// final position, so every cell is initialized and the tables agree even if
/// the comparator panics.
struct Hole<'a, T> {
    entries: &'a mut [Entry<T>],
    slots: &'a mut [Slot],
    elt: ManuallyDrop<T>,
    slot: u32,
    pos: usize,
}

impl<'a, T> Hole<'a, T> {
    /// # Safety
    ///
    /// `pos < entries.len()` and every item in `entries` is initialized.
    #[inline]
    unsafe fn new(entries: &'a mut [Entry<T>], slots: &'a mut [Slot], pos: usize) -> Self {
        debug_assert!(pos < entries.len());
        let entry = unsafe { entries.get_unchecked(pos) };
        let elt = unsafe { entry.item.assume_init_read() };
        let slot = entry.slot;
        Hole {
            entries,
            slots,
            elt: ManuallyDrop::new(elt),
            slot,
            pos,
        }
    }

    #[inline]
    fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    fn element(&self) -> &T {
        &self.elt
    }

    /// # Safety
    ///
    /// `index < entries.len()` and `index != pos`.
    #[inline]
    unsafe fn get(&self, index: usize) -> &T {
        debug_assert!(index != self.pos && index < self.entries.len());
        unsafe { self.entries.get_unchecked(index).item.assume_init_ref() }
    }

    /// Shifts the entry at `index` into the hole; the hole moves to `index`.
    ///
    /// # Safety
    ///
    /// `index < entries.len()` and `index != pos`.
    #[inline]
    unsafe fn move_to(&mut self, index: usize) {
        debug_assert!(index != self.pos && index < self.entries.len());
        unsafe {
            let base = self.entries.as_mut_ptr();
            ptr::copy_nonoverlapping(base.add(index), base.add(self.pos), 1);
            let moved = (*base.add(self.pos)).slot;
            self.slots.get_unchecked_mut(moved as usize).pos = self.pos as u32;
        }
        self.pos = index;
    }
}

impl<T> Drop for Hole<'_, T> {
    #[inline]
    fn drop(&mut self) {
        let pos = self.pos;
        unsafe {
            let entry = self.entries.get_unchecked_mut(pos);
            entry.item.write(ManuallyDrop::take(&mut self.elt));
            entry.slot = self.slot;
            self.slots.get_unchecked_mut(self.slot as usize).pos = pos as u32;
        }
    }
}


#[cfg(test)]
mod bench_indexed_heap {
    use super::*;
    use hdrhistogram::Histogram;

    use std::hint::black_box;
    use std::time::Instant;

    const HEAP_SIZE: usize = 1024;
    const ITERATIONS: usize = 100_000;

    /// Latency samples for one operation, in nanoseconds.
    struct Samples {
        op: &'static str,
        hist: Histogram<u64>,
    }

    impl Samples {
        fn new(op: &'static str) -> Self {
            Self {
                op,
                hist: Histogram::new_with_bounds(1, 1_000_000, 3).unwrap(),
            }
        }

        /// Runs `f` once and records how long it took.
        fn measure<R>(&mut self, f: impl FnOnce() -> R) -> R {
            let start = Instant::now();
            let out = black_box(f());
            let nanos = start.elapsed().as_nanos() as u64;
            self.hist.saturating_record(nanos.max(1));
            out
        }
    }

    fn report(title: &str, rows: &[Samples]) {
        println!("\n{title}");
        println!("{:<8} {:>8} {:>8} {:>8} {:>8}", "op", "mean", "p50", "p99", "p99.9");
        for row in rows {
            let h = &row.hist;
            println!(
                "{:<8} {:>8.1} {:>8} {:>8} {:>8}",
                row.op,
                h.mean(),
                h.value_at_quantile(0.5),
                h.value_at_quantile(0.99),
                h.value_at_quantile(0.999),
            );
        }
    }

    #[test]
    #[ignore]
    fn bench_heap_churn() {
        let mut heap = IndexedHeap::with_capacity(HEAP_SIZE * 2).unwrap();
        for i in 0..HEAP_SIZE {
            heap.insert(((i * 7 + 13) % HEAP_SIZE) as u64);
        }

        let mut insert = Samples::new("insert");
        let mut pop = Samples::new("pop");
        let mut remove = Samples::new("remove");

        for i in 0..ITERATIONS {
            assert!(pop.measure(|| heap.try_pop()).is_some());
            let h = insert.measure(|| heap.insert((i % HEAP_SIZE) as u64));
            assert!(remove.measure(|| heap.remove(h)).is_ok());
            heap.insert(((i + 500) % HEAP_SIZE) as u64);
        }
        assert_eq!(heap.len(), HEAP_SIZE);

        report(
            &format!("IndexedHeap<u64>, {HEAP_SIZE} live, {ITERATIONS} rounds (ns)"),
            &[insert, pop, remove],
        );
    }
}
