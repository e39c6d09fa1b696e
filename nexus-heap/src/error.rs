//! Error types for heap operations.
//!
//! Every error is reported before the heap is modified, so a rejected call
//! leaves the container exactly as it was.

use core::fmt;

/// Why a [`Handle`](crate::Handle) failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleError {
    /// The handle was issued by a different heap.
    WrongOwner,
    /// The handle names a slot beyond the heap's current capacity.
    OutOfRange,
    /// The element the handle named has already been removed.
    AlreadyRemoved,
}

impl fmt::Display for HandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleError::WrongOwner => write!(f, "handle belongs to another heap"),
            HandleError::OutOfRange => write!(f, "handle slot is out of range"),
            HandleError::AlreadyRemoved => write!(f, "handle refers to a removed element"),
        }
    }
}

impl std::error::Error for HandleError {}

/// Invalid construction or capacity arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigError {
    /// Capacity is zero.
    ZeroCapacity,
    /// Capacity exceeds what slot ids or the address space can represent.
    CapacityOverflow,
    /// The allocator could not provide the backing buffers.
    AllocationFailed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCapacity => write!(f, "capacity cannot be zero"),
            ConfigError::CapacityOverflow => write!(f, "capacity overflow"),
            ConfigError::AllocationFailed => write!(f, "memory allocation failed"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error returned by fallible heap operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapError {
    /// `peek` or `pop` on an empty heap.
    Empty,
    /// The handle could not be resolved.
    InvalidHandle(HandleError),
    /// Requested capacity cannot hold the live elements.
    CapacityTooSmall {
        /// Capacity that was asked for.
        requested: usize,
        /// Smallest capacity that keeps every live element and handle.
        required: usize,
    },
    /// Comparator changes require an empty heap.
    NotEmpty,
    /// Bad constructor or capacity arguments.
    InvalidConfiguration(ConfigError),
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::Empty => write!(f, "heap is empty"),
            HeapError::InvalidHandle(err) => write!(f, "invalid handle: {err}"),
            HeapError::CapacityTooSmall {
                requested,
                required,
            } => write!(
                f,
                "capacity {requested} is too small (at least {required} required)"
            ),
            HeapError::NotEmpty => write!(f, "heap is not empty"),
            HeapError::InvalidConfiguration(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

impl std::error::Error for HeapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HeapError::InvalidHandle(err) => Some(err),
            HeapError::InvalidConfiguration(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HandleError> for HeapError {
    #[inline]
    fn from(err: HandleError) -> Self {
        HeapError::InvalidHandle(err)
    }
}

impl From<ConfigError> for HeapError {
    #[inline]
    fn from(err: ConfigError) -> Self {
        HeapError::InvalidConfiguration(err)
    }
}
