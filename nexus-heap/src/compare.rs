//! Ordering policies.
//!
//! A heap is parameterized by a [`Compare`] strategy chosen at construction.
//! The element that compares least is extracted first, so [`MinOrder`] gives a
//! min-heap and [`MaxOrder`] a max-heap.

use core::cmp::Ordering;
use core::fmt;

/// Three-way comparison used to order heap elements.
///
/// Must be a consistent total preorder. An inconsistent policy produces an
/// unspecified extraction order but never memory unsafety.
///
/// # Example
///
/// ```
/// use nexus_heap::{Compare, IndexedHeap};
/// use std::cmp::Ordering;
///
/// struct ByLen;
///
/// impl Compare<String> for ByLen {
///     fn compare(&self, a: &String, b: &String) -> Ordering {
///         a.len().cmp(&b.len())
///     }
/// }
///
/// let mut heap = IndexedHeap::with_comparator(4, ByLen).unwrap();
/// heap.insert("three".to_string());
/// heap.insert("a".to_string());
/// assert_eq!(heap.pop().unwrap(), "a");
/// ```
pub trait Compare<T: ?Sized> {
    /// Returns `Less` if `a` must be extracted before `b`.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// Smallest element first, by `Ord`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MinOrder;

impl<T: Ord + ?Sized> Compare<T> for MinOrder {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Largest element first, by `Ord`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaxOrder;

impl<T: Ord + ?Sized> Compare<T> for MaxOrder {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        b.cmp(a)
    }
}

/// Ordering given by a closure.
///
/// ```
/// use nexus_heap::{IndexedHeap, OrderBy};
///
/// let mut heap = IndexedHeap::with_comparator(
///     8,
///     OrderBy(|a: &(u32, char), b: &(u32, char)| a.0.cmp(&b.0)),
/// )
/// .unwrap();
/// heap.insert((5, 'e'));
/// heap.insert((2, 'b'));
/// assert_eq!(heap.pop().unwrap().1, 'b');
/// ```
#[derive(Clone, Copy)]
pub struct OrderBy<F>(pub F);

impl<T: ?Sized, F> Compare<T> for OrderBy<F>
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.0)(a, b)
    }
}

impl<F> fmt::Debug for OrderBy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OrderBy(..)")
    }
}

impl<T: ?Sized, C: Compare<T> + ?Sized> Compare<T> for &C {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (**self).compare(a, b)
    }
}

// Enables `Box<dyn Compare<T>>` when the policy is only known at runtime.
impl<T: ?Sized, C: Compare<T> + ?Sized> Compare<T> for Box<C> {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (**self).compare(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_and_max() {
        assert_eq!(MinOrder.compare(&1, &2), Ordering::Less);
        assert_eq!(MaxOrder.compare(&1, &2), Ordering::Greater);
        assert_eq!(MaxOrder.compare(&2, &2), Ordering::Equal);
    }

    #[test]
    fn order_by_closure() {
        let by_abs = OrderBy(|a: &i32, b: &i32| a.abs().cmp(&b.abs()));
        assert_eq!(by_abs.compare(&-1, &2), Ordering::Less);
        assert_eq!(by_abs.compare(&-3, &3), Ordering::Equal);
    }

    #[test]
    fn boxed_dyn() {
        let policy: Box<dyn Compare<u8>> = Box::new(MaxOrder);
        assert_eq!(policy.compare(&9, &1), Ordering::Less);
    }
}
