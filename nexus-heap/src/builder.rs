//! Heap configuration.

use crate::alloc::{Allocator, Global};
use crate::compare::{Compare, MinOrder};
use crate::error::HeapError;
use crate::heap::IndexedHeap;
use crate::shared::SharedHeap;

/// Initial capacity when none is configured.
pub const DEFAULT_CAPACITY: usize = 16;

/// Builder for [`IndexedHeap`].
///
/// ```
/// use nexus_heap::{HeapBuilder, MaxOrder};
///
/// let mut heap = HeapBuilder::default()
///     .capacity(64)
///     .comparator(MaxOrder)
///     .build::<u32>()
///     .unwrap();
///
/// heap.insert(1);
/// heap.insert(9);
/// assert_eq!(heap.pop(), Ok(9));
/// assert_eq!(heap.capacity(), 64);
/// ```
#[derive(Clone, Debug)]
pub struct HeapBuilder<C = MinOrder, A = Global> {
    capacity: usize,
    comparator: C,
    allocator: A,
}

impl Default for HeapBuilder {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            comparator: MinOrder,
            allocator: Global,
        }
    }
}

impl<C, A: Allocator> HeapBuilder<C, A> {
    /// Initial capacity. The heap still doubles when full. Default: 16.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Ordering policy. Default: [`MinOrder`].
    pub fn comparator<C2>(self, comparator: C2) -> HeapBuilder<C2, A> {
        HeapBuilder {
            capacity: self.capacity,
            comparator,
            allocator: self.allocator,
        }
    }

    /// Allocator for the backing tables. Default: [`Global`].
    pub fn allocator<A2: Allocator>(self, allocator: A2) -> HeapBuilder<C, A2> {
        HeapBuilder {
            capacity: self.capacity,
            comparator: self.comparator,
            allocator,
        }
    }

    /// Builds the heap.
    ///
    /// # Errors
    ///
    /// [`HeapError::InvalidConfiguration`] if the capacity is zero, too large,
    /// or cannot be allocated.
    pub fn build<T>(self) -> Result<IndexedHeap<T, C, A>, HeapError>
    where
        C: Compare<T>,
    {
        IndexedHeap::with_comparator_in(self.capacity, self.comparator, self.allocator)
    }

    /// Builds the heap behind a [`SharedHeap`].
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_shared<T>(self) -> Result<SharedHeap<T, C, A>, HeapError>
    where
        C: Compare<T>,
    {
        self.build().map(SharedHeap::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::AllocError;
    use crate::compare::OrderBy;
    use crate::error::ConfigError;
    use core::alloc::Layout;
    use core::ptr::NonNull;
    use std::cell::Cell;

    /// Global allocator that counts live blocks.
    #[derive(Default)]
    struct Counting {
        live: Cell<isize>,
    }

    unsafe impl Allocator for Counting {
        fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
            let ptr = Global.allocate(layout)?;
            self.live.set(self.live.get() + 1);
            Ok(ptr)
        }

        unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
            self.live.set(self.live.get() - 1);
            unsafe { Global.free(ptr, layout) };
        }
    }

    /// Global allocator that succeeds a set number of times, then refuses.
    ///
    /// With no budget every request succeeds. Only the default `reallocate`
    /// is used, so each resize costs one allocation.
    #[derive(Default)]
    struct Budgeted {
        budget: Cell<Option<usize>>,
        live: Cell<isize>,
    }

    impl Budgeted {
        fn allow(&self, budget: Option<usize>) {
            self.budget.set(budget);
        }
    }

    unsafe impl Allocator for Budgeted {
        fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
            match self.budget.get() {
                Some(0) => return Err(AllocError::new(layout)),
                Some(n) => self.budget.set(Some(n - 1)),
                None => {}
            }
            let ptr = Global.allocate(layout)?;
            self.live.set(self.live.get() + 1);
            Ok(ptr)
        }

        unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
            self.live.set(self.live.get() - 1);
            unsafe { Global.free(ptr, layout) };
        }
    }

    /// Refuses every request.
    struct Refusing;

    unsafe impl Allocator for Refusing {
        fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
            Err(AllocError::new(layout))
        }

        unsafe fn free(&self, _ptr: NonNull<u8>, _layout: Layout) {
            unreachable!("nothing was allocated");
        }
    }

    #[test]
    fn defaults() {
        let heap = HeapBuilder::default().build::<u64>().unwrap();
        assert_eq!(heap.capacity(), DEFAULT_CAPACITY);
        assert!(heap.is_empty());
    }

    #[test]
    fn closure_comparator() {
        let mut heap = HeapBuilder::default()
            .capacity(4)
            .comparator(OrderBy(|a: &(u8, u8), b: &(u8, u8)| a.1.cmp(&b.1)))
            .build()
            .unwrap();
        heap.insert((1, 9));
        heap.insert((2, 3));
        assert_eq!(heap.pop(), Ok((2, 3)));
    }

    #[test]
    fn zero_capacity_fails() {
        let err = HeapBuilder::default().capacity(0).build::<u8>().err();
        assert_eq!(
            err,
            Some(HeapError::InvalidConfiguration(ConfigError::ZeroCapacity))
        );
    }

    #[test]
    fn allocator_failure_is_reported() {
        let err = HeapBuilder::default()
            .allocator(Refusing)
            .build::<u32>()
            .err();
        assert_eq!(
            err,
            Some(HeapError::InvalidConfiguration(ConfigError::AllocationFailed))
        );
    }

    #[test]
    fn custom_allocator_balances() {
        let counting = Counting::default();
        {
            let mut heap = HeapBuilder::default()
                .capacity(2)
                .allocator(&counting)
                .build::<String>()
                .unwrap();
            assert_eq!(counting.live.get(), 2);

            for i in 0..40 {
                heap.insert(i.to_string());
            }
            heap.set_capacity(200).unwrap();
            heap.clear();
            heap.shrink_to_fit();
            assert_eq!(heap.capacity(), 1);
            assert_eq!(counting.live.get(), 2);
        }
        assert_eq!(counting.live.get(), 0);
    }

    #[test]
    fn failed_grow_leaves_heap_unchanged() {
        let alloc = Budgeted::default();
        {
            let mut heap = HeapBuilder::default()
                .capacity(4)
                .allocator(&alloc)
                .build::<u32>()
                .unwrap();
            let handles: Vec<_> = [7, 3, 9, 1]
                .into_iter()
                .map(|v| (v, heap.insert(v)))
                .collect();

            // The heap array grows, then the slot table cannot.
            alloc.allow(Some(1));
            assert_eq!(
                heap.set_capacity(64),
                Err(HeapError::InvalidConfiguration(ConfigError::AllocationFailed))
            );
            assert_eq!(heap.capacity(), 4);
            assert_eq!(heap.len(), 4);
            assert_eq!(heap.peek(), Ok(&1));
            for &(v, h) in &handles {
                assert_eq!(heap.get(h), Some(&v));
            }

            alloc.allow(None);
            let h = heap.insert(5);
            assert_eq!(heap.capacity(), 8);
            assert_eq!(heap.get(h), Some(&5));
            for &(v, h) in &handles {
                assert_eq!(heap.get(h), Some(&v));
            }
            assert_eq!(heap.into_sorted_vec(), vec![1, 3, 5, 7, 9]);
        }
        assert_eq!(alloc.live.get(), 0);
    }

    #[test]
    fn failed_shrink_keeps_old_buffers() {
        let alloc = Budgeted::default();
        {
            let mut heap = HeapBuilder::default()
                .capacity(16)
                .allocator(&alloc)
                .build::<u32>()
                .unwrap();
            let handles: Vec<_> = (0..4).map(|v| (v, heap.insert(v))).collect();

            alloc.allow(Some(0));
            heap.set_capacity(4).unwrap();
            assert_eq!(heap.capacity(), 4);
            for &(v, h) in &handles {
                assert_eq!(heap.get(h), Some(&v));
            }

            // Regrowth fits in the kept buffers without allocating.
            for v in 4..8 {
                heap.insert(v);
            }
            assert_eq!(heap.capacity(), 8);
            for &(v, h) in &handles {
                assert_eq!(heap.get(h), Some(&v));
            }

            alloc.allow(None);
            heap.shrink_to_fit();
            assert_eq!(heap.capacity(), 8);
            assert_eq!(heap.into_sorted_vec(), (0..8).collect::<Vec<_>>());
        }
        assert_eq!(alloc.live.get(), 0);
    }

    #[test]
    fn shared() {
        let heap = HeapBuilder::default().build_shared::<i32>().unwrap();
        heap.insert(3);
        heap.insert(-1);
        assert_eq!(heap.pop(), Ok(-1));
    }
}
