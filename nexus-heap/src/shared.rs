//! A reference-counted heap for several owners on one thread.
//!
//! [`IndexedHeap`] is not `Clone`. When several components need to push and
//! cancel against the same queue, they share a [`SharedHeap`]: every clone
//! aliases one container, so handles issued through one clone work through
//! any other and capacity changes are seen by all of them.

use core::cell::{Ref, RefCell, RefMut};
use core::fmt;
use std::rc::Rc;

use crate::alloc::{Allocator, Global};
use crate::compare::{Compare, MinOrder};
use crate::error::HeapError;
use crate::handle::Handle;
use crate::heap::IndexedHeap;

/// Cloneable, single-threaded view of one [`IndexedHeap`].
///
/// Each method borrows the container for the duration of the call only.
/// Calling back into the same heap from a comparator panics on the
/// `RefCell` borrow.
///
/// ```
/// use nexus_heap::{IndexedHeap, SharedHeap};
///
/// let scheduler = SharedHeap::new(IndexedHeap::with_capacity(8).unwrap());
/// let canceller = scheduler.clone();
///
/// let timer = scheduler.insert(30);
/// scheduler.insert(10);
/// assert_eq!(canceller.remove(timer), Ok(30));
/// assert_eq!(scheduler.len(), 1);
/// ```
pub struct SharedHeap<T, C = MinOrder, A: Allocator = Global> {
    inner: Rc<RefCell<IndexedHeap<T, C, A>>>,
}

impl<T, C, A: Allocator> SharedHeap<T, C, A> {
    /// Wraps `heap` for shared use.
    pub fn new(heap: IndexedHeap<T, C, A>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(heap)),
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Returns `true` if the heap is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Current capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.borrow().capacity()
    }

    /// Returns `true` if `handle` names a live element.
    #[inline]
    pub fn is_valid(&self, handle: Handle) -> bool {
        self.inner.borrow().is_valid(handle)
    }

    /// Removes every element, invalidating every handle.
    pub fn clear(&self) {
        self.inner.borrow_mut().clear();
    }

    /// Borrows the underlying heap.
    ///
    /// # Panics
    ///
    /// Panics if the heap is mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, IndexedHeap<T, C, A>> {
        self.inner.borrow()
    }

    /// Mutably borrows the underlying heap.
    ///
    /// # Panics
    ///
    /// Panics if the heap is already borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, IndexedHeap<T, C, A>> {
        self.inner.borrow_mut()
    }

    /// Returns `true` if both views alias the same heap.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T, C: Compare<T>, A: Allocator> SharedHeap<T, C, A> {
    /// See [`IndexedHeap::insert`].
    pub fn insert(&self, item: T) -> Handle {
        self.inner.borrow_mut().insert(item)
    }

    /// See [`IndexedHeap::pop`].
    pub fn pop(&self) -> Result<T, HeapError> {
        self.inner.borrow_mut().pop()
    }

    /// See [`IndexedHeap::try_pop`].
    pub fn try_pop(&self) -> Option<T> {
        self.inner.borrow_mut().try_pop()
    }

    /// See [`IndexedHeap::remove`].
    pub fn remove(&self, handle: Handle) -> Result<T, HeapError> {
        self.inner.borrow_mut().remove(handle)
    }

    /// Clones the top element out.
    ///
    /// # Errors
    ///
    /// [`HeapError::Empty`] if the heap has no elements.
    pub fn peek_cloned(&self) -> Result<T, HeapError>
    where
        T: Clone,
    {
        self.inner.borrow().peek().cloned()
    }
}

impl<T, C, A: Allocator> Clone for SharedHeap<T, C, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T, C, A: Allocator> From<IndexedHeap<T, C, A>> for SharedHeap<T, C, A> {
    fn from(heap: IndexedHeap<T, C, A>) -> Self {
        Self::new(heap)
    }
}

impl<T: fmt::Debug, C, A: Allocator> fmt::Debug for SharedHeap<T, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(heap) => f.debug_tuple("SharedHeap").field(&*heap).finish(),
            Err(_) => f.write_str("SharedHeap(<borrowed>)"),
        }
    }
}
