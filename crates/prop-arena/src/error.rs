//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
///
/// Reading a location after it was released is not an error: the slot
/// keeps its stale value until the allocator hands it out again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The backing store cannot grow past its configured page ceiling.
    CapacityExceeded {
        /// Page count the growth would have produced.
        requested_pages: u32,
        /// Configured maximum page count.
        max_pages: u32,
    },
    /// The operation is not available on this allocator.
    ///
    /// Block allocators refuse single-element allocation and release.
    Unsupported {
        /// Name of the refused operation.
        operation: &'static str,
    },
    /// A location at or past the end of the backing store.
    OutOfBounds {
        /// The offending location, in elements.
        location: usize,
        /// Current store capacity, in elements.
        capacity: usize,
    },
    /// Release of a location the allocator never handed out.
    NotAllocated {
        /// The offending location, in elements.
        location: usize,
    },
    /// Release of a location that is already in the free set.
    DoubleRelease {
        /// The offending location, in elements.
        location: usize,
    },
    /// Block release at a location that is not a block base.
    Misaligned {
        /// The offending location, in elements.
        location: usize,
        /// Block width of the allocator.
        block_size: usize,
    },
    /// A byte pointer handed to the computation module does not address
    /// a whole block inside its memory.
    BadPointer {
        /// The offending byte pointer.
        pointer: u32,
        /// Length of the module memory in bytes.
        memory_len: usize,
    },
    /// Two handles from different arenas were combined in one call.
    ForeignHandle,
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested_pages,
                max_pages,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested_pages} pages, maximum {max_pages} pages"
                )
            }
            Self::Unsupported { operation } => {
                write!(f, "operation not supported by this allocator: {operation}")
            }
            Self::OutOfBounds { location, capacity } => {
                write!(
                    f,
                    "location {location} out of bounds for capacity {capacity}"
                )
            }
            Self::NotAllocated { location } => {
                write!(f, "location {location} was never allocated")
            }
            Self::DoubleRelease { location } => {
                write!(f, "location {location} released twice")
            }
            Self::Misaligned {
                location,
                block_size,
            } => {
                write!(
                    f,
                    "location {location} is not a base of a {block_size}-element block"
                )
            }
            Self::BadPointer {
                pointer,
                memory_len,
            } => {
                write!(
                    f,
                    "pointer {pointer} out of range for module memory of {memory_len} bytes"
                )
            }
            Self::ForeignHandle => write!(f, "handles belong to different arenas"),
        }
    }
}

impl Error for ArenaError {}
