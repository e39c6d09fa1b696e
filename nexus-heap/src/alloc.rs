//! Allocator capability for the heap's backing buffers.
//!
//! The heap never talks to `std::alloc` directly. Both of its tables are raw
//! buffers obtained through an [`Allocator`], so callers can route the memory
//! through an arena, a counting wrapper, or anything else that can hand out
//! aligned blocks.

use core::fmt;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};
use std::alloc::Layout;

use crate::error::ConfigError;

/// Error returned when an allocator cannot satisfy a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError {
    layout: Layout,
}

impl AllocError {
    /// Creates an error for the layout that could not be allocated.
    #[inline]
    pub const fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// Returns the layout of the failed request.
    #[inline]
    pub const fn layout(&self) -> Layout {
        self.layout
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to allocate {} bytes (align {})",
            self.layout.size(),
            self.layout.align()
        )
    }
}

impl std::error::Error for AllocError {}

/// Raw buffer allocation.
///
/// The heap only ever requests non-zero sized layouts.
///
/// # Safety
///
/// Implementors guarantee:
///
/// 1. A successful `allocate` returns a block valid for reads and writes of
///    `layout.size()` bytes, aligned to `layout.align()`, that stays valid
///    until passed to `free` or `reallocate`.
/// 2. A successful `reallocate` returns a block satisfying (1) for the new
///    layout whose first `min(old.size(), new.size())` bytes equal the old
///    block's. On failure the old block is untouched and still owned by the
///    caller.
pub unsafe trait Allocator {
    /// Allocates a block for `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases a block.
    ///
    /// # Safety
    ///
    /// `ptr` must come from this allocator with exactly `layout`.
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout);

    /// Resizes a block, preserving its common prefix.
    ///
    /// The default implementation allocates, copies, and frees.
    ///
    /// # Safety
    ///
    /// `ptr` must come from this allocator with exactly `old`.
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        let fresh = self.allocate(new)?;
        unsafe {
            ptr::copy_nonoverlapping(
                ptr.as_ptr(),
                fresh.as_ptr(),
                old.size().min(new.size()),
            );
            self.free(ptr, old);
        }
        Ok(fresh)
    }
}

unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { (**self).free(ptr, layout) }
    }

    #[inline]
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        unsafe { (**self).reallocate(ptr, old, new) }
    }
}

/// The process-wide allocator (`std::alloc`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Global;

unsafe impl Allocator for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() > 0, "zero-sized allocation");
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError::new(layout))
    }

    #[inline]
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        if old.align() != new.align() {
            let fresh = self.allocate(new)?;
            unsafe {
                ptr::copy_nonoverlapping(
                    ptr.as_ptr(),
                    fresh.as_ptr(),
                    old.size().min(new.size()),
                );
                self.free(ptr, old);
            }
            return Ok(fresh);
        }

        let raw = unsafe { std::alloc::realloc(ptr.as_ptr(), old, new.size()) };
        NonNull::new(raw).ok_or(AllocError::new(new))
    }
}

// =============================================================================
// RawBuf - typed, fixed-length buffer with no element drop glue
// =============================================================================

/// A typed buffer of `cap` elements obtained from an [`Allocator`].
///
/// `RawBuf` neither initializes nor drops elements, and it does not remember
/// its allocator: the owner passes the same allocator to every call. Dropping a
/// `RawBuf` without [`release`](Self::release) leaks the block.
pub(crate) struct RawBuf<E> {
    ptr: NonNull<E>,
    cap: usize,
    _marker: PhantomData<E>,
}

// Safety: RawBuf is a uniquely owned block of E.
unsafe impl<E: Send> Send for RawBuf<E> {}
unsafe impl<E: Sync> Sync for RawBuf<E> {}

impl<E> RawBuf<E> {
    /// Layout for `cap` elements.
    #[inline]
    pub(crate) fn layout(cap: usize) -> Result<Layout, ConfigError> {
        Layout::array::<E>(cap).map_err(|_| ConfigError::CapacityOverflow)
    }

    /// Allocates an uninitialized buffer of `cap > 0` elements.
    pub(crate) fn allocate<A: Allocator>(alloc: &A, cap: usize) -> Result<Self, AllocError> {
        debug_assert!(cap > 0 && size_of::<E>() > 0);
        let layout = Self::layout_unchecked(cap);
        let ptr = alloc.allocate(layout)?;
        Ok(Self {
            ptr: ptr.cast(),
            cap,
            _marker: PhantomData,
        })
    }

    /// Number of element slots in the block.
    #[inline]
    pub(crate) const fn cap(&self) -> usize {
        self.cap
    }

    #[inline]
    pub(crate) const fn as_ptr(&self) -> *mut E {
        self.ptr.as_ptr()
    }

    /// Resizes the block to `new_cap > 0` elements, preserving the first
    /// `min(cap, new_cap)`. On failure the buffer is unchanged.
    pub(crate) fn reallocate<A: Allocator>(
        &mut self,
        alloc: &A,
        new_cap: usize,
    ) -> Result<(), AllocError> {
        debug_assert!(new_cap > 0);
        if new_cap == self.cap {
            return Ok(());
        }

        let old = Self::layout_unchecked(self.cap);
        let new = Self::layout_unchecked(new_cap);
        // Safety: ptr was allocated by `alloc` with `old`.
        let ptr = unsafe { alloc.reallocate(self.ptr.cast(), old, new)? };
        self.ptr = ptr.cast();
        self.cap = new_cap;
        Ok(())
    }

    /// Returns the block to the allocator.
    ///
    /// # Safety
    ///
    /// `alloc` must be the allocator the buffer came from, and the buffer must
    /// not be used afterwards.
    pub(crate) unsafe fn release<A: Allocator>(&mut self, alloc: &A) {
        let layout = Self::layout_unchecked(self.cap);
        unsafe { alloc.free(self.ptr.cast(), layout) }
    }

    // Callers validate capacities through `layout` before the first allocation,
    // and capacities never exceed the validated maximum afterwards.
    #[inline]
    fn layout_unchecked(cap: usize) -> Layout {
        match Layout::array::<E>(cap) {
            Ok(layout) => layout,
            Err(_) => panic!("capacity overflow"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_allocate_and_free() {
        let layout = Layout::array::<u64>(16).unwrap();
        let ptr = Global.allocate(layout).unwrap();
        assert_eq!(ptr.as_ptr() as usize % layout.align(), 0);
        unsafe { Global.free(ptr, layout) };
    }

    #[test]
    fn global_reallocate_preserves_prefix() {
        let old = Layout::array::<u32>(4).unwrap();
        let new = Layout::array::<u32>(64).unwrap();
        let ptr = Global.allocate(old).unwrap();
        unsafe {
            let p = ptr.as_ptr() as *mut u32;
            for i in 0..4 {
                p.add(i).write(i as u32 * 10);
            }
            let grown = Global.reallocate(ptr, old, new).unwrap();
            let p = grown.as_ptr() as *mut u32;
            for i in 0..4 {
                assert_eq!(*p.add(i), i as u32 * 10);
            }
            Global.free(grown, new);
        }
    }

    #[test]
    fn default_reallocate_copies() {
        // Allocator that only forwards allocate/free, exercising the provided
        // reallocate.
        struct Plain;

        unsafe impl Allocator for Plain {
            fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
                Global.allocate(layout)
            }

            unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
                unsafe { Global.free(ptr, layout) }
            }
        }

        let mut buf: RawBuf<u16> = RawBuf::allocate(&Plain, 8).unwrap();
        unsafe {
            for i in 0..8 {
                buf.as_ptr().add(i).write(i as u16 + 1);
            }
        }
        buf.reallocate(&Plain, 3).unwrap();
        assert_eq!(buf.cap(), 3);
        unsafe {
            assert_eq!(*buf.as_ptr(), 1);
            assert_eq!(*buf.as_ptr().add(2), 3);
            buf.release(&Plain);
        }
    }

    #[test]
    fn layout_overflow_is_config_error() {
        assert_eq!(
            RawBuf::<u64>::layout(usize::MAX).unwrap_err(),
            ConfigError::CapacityOverflow
        );
    }

    #[test]
    fn alloc_error_display() {
        let layout = Layout::from_size_align(64, 8).unwrap();
        let err = AllocError::new(layout);
        assert_eq!(err.layout(), layout);
        assert_eq!(err.to_string(), "failed to allocate 64 bytes (align 8)");
    }
}
