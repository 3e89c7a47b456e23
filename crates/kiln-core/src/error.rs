//! Error types for the Kiln workspace.
//!
//! Element operations report failure by panicking; the enums here cover only
//! what the container itself can detect: storage sizing, allocator refusal
//! and invalid configuration.

use std::error::Error;
use std::fmt;

/// Errors from acquiring raw storage.
///
/// Returned by the fallible `try_*` constructors and reservation methods.
/// The infallible forms panic on [`CapacityOverflow`](Self::CapacityOverflow)
/// and hand [`AllocationFailed`](Self::AllocationFailed) to the global
/// allocation error handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// The requested slot count does not fit in `isize::MAX` bytes, or a
    /// growth computation overflowed `usize`.
    CapacityOverflow {
        /// Number of slots that was requested.
        requested: usize,
    },
    /// The allocator returned null for a well-formed request.
    AllocationFailed {
        /// Size of the rejected request in bytes.
        bytes: usize,
        /// Alignment of the rejected request in bytes.
        align: usize,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow { requested } => {
                write!(f, "capacity overflow: {requested} slots requested")
            }
            Self::AllocationFailed { bytes, align } => {
                write!(f, "allocation failed: {bytes} bytes with alignment {align}")
            }
        }
    }
}

impl Error for StorageError {}

/// Errors from validating a [`GrowthPolicy`](crate::GrowthPolicy).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The growth factor would not strictly increase a non-zero capacity.
    FactorTooSmall {
        /// The rejected factor.
        factor: usize,
    },
    /// A minimum capacity of zero would never leave the empty state.
    ZeroMinimumCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FactorTooSmall { factor } => {
                write!(f, "growth factor must be at least 2, got {factor}")
            }
            Self::ZeroMinimumCapacity => write!(f, "minimum growth capacity must be non-zero"),
        }
    }
}

impl Error for ConfigError {}
