//! Addressable binary heap with stable, generation-tagged handles.
//!
//! A plain binary heap can only give up its top element. Timer wheels, order
//! books and schedulers also need to cancel an arbitrary entry, which means
//! finding it first. This crate keeps the lookup O(1) and the removal
//! O(log n) without ever scanning.
//!
//! # Design
//!
//! ```text
//! heap array   [ e0 | e1 | e2 | e3 | .. ]   items in heap order, each tagged
//!                 |    |    |                with a slot id
//! slot table   [ s0 | s1 | s2 | s3 | .. ]   slot id -> heap position,
//!                                            plus a generation counter
//! ```
//!
//! - Every sift updates the slot table, so a slot always knows where its item
//!   currently sits.
//! - [`insert`](IndexedHeap::insert) returns a [`Handle`]: slot id,
//!   generation, and the id of the heap that issued it.
//! - Removing an item bumps its slot's generation. Old handles stop matching
//!   even after the slot is reused.
//! - A handle presented to the wrong heap is rejected, not misinterpreted.
//!
//! # Quick Start
//!
//! ```
//! use nexus_heap::IndexedHeap;
//!
//! let mut timers = IndexedHeap::with_capacity(1024).unwrap();
//!
//! let _flush = timers.insert((100u64, "flush"));
//! let retry = timers.insert((250u64, "retry"));
//! let _ping = timers.insert((50u64, "ping"));
//!
//! // Cancel one without touching the rest.
//! assert_eq!(timers.remove(retry).unwrap().1, "retry");
//! assert!(!timers.is_valid(retry));
//!
//! // Fire everything due by t=120.
//! let fired: Vec<_> = timers.drain_while(|t| t.0 <= 120).map(|t| t.1).collect();
//! assert_eq!(fired, ["ping", "flush"]);
//! assert!(timers.is_empty());
//! ```
//!
//! # Ordering
//!
//! The heap extracts whatever compares least under its [`Compare`] policy:
//!
//! | Policy | Top element |
//! |--------|-------------|
//! | [`MinOrder`] (default) | smallest by `Ord` |
//! | [`MaxOrder`] | largest by `Ord` |
//! | [`OrderBy`] | least by a closure |
//! | `Box<dyn Compare<T>>` | chosen at runtime |
//!
//! The policy can only be swapped on an empty heap.
//!
//! # Capacity
//!
//! Capacity is a hint, not a bound: inserting into a full heap doubles it, and
//! live handles survive every resize. Shrinking is allowed down to the highest
//! slot id still in use. Tables come from an [`Allocator`], [`Global`] unless
//! configured through [`HeapBuilder`].
//!
//! # Sharing
//!
//! [`IndexedHeap`] is not `Clone`. Use [`SharedHeap`] when several owners on
//! one thread must operate on the same queue.

#![warn(missing_docs)]

pub mod alloc;
pub mod builder;
pub mod compare;
pub mod error;
pub mod handle;
pub mod heap;
pub mod shared;
mod table;

pub use alloc::{AllocError, Allocator, Global};
pub use builder::{DEFAULT_CAPACITY, HeapBuilder};
pub use compare::{Compare, MaxOrder, MinOrder, OrderBy};
pub use error::{ConfigError, HandleError, HeapError};
pub use handle::Handle;
pub use heap::{DrainWhile, IndexedHeap, Iter};
pub use shared::SharedHeap;
