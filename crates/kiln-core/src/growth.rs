//! Growth configuration for implicit capacity expansion.

use crate::error::{ConfigError, StorageError};

/// How an array expands its storage when a push or insert finds it full.
///
/// The next capacity is `max(min_capacity, capacity * factor)`, so the
/// default policy gives `max(1, 2 * capacity)` and amortized constant-time
/// appends. Validated at construction; immutable afterwards.
///
/// Explicit requests (`reserve`, `resize`) bypass the policy and allocate
/// exactly what was asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthPolicy {
    factor: usize,
    min_capacity: usize,
}

impl GrowthPolicy {
    /// Default multiplier applied to a full, non-empty storage block.
    pub const DEFAULT_FACTOR: usize = 2;

    /// Default capacity of the first allocation made by implicit growth.
    pub const DEFAULT_MIN_CAPACITY: usize = 1;

    /// The default policy: `max(1, 2 * capacity)`.
    pub const DEFAULT: Self = Self {
        factor: Self::DEFAULT_FACTOR,
        min_capacity: Self::DEFAULT_MIN_CAPACITY,
    };

    /// Create a validated policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FactorTooSmall`] if `factor < 2` and
    /// [`ConfigError::ZeroMinimumCapacity`] if `min_capacity == 0`.
    pub fn new(factor: usize, min_capacity: usize) -> Result<Self, ConfigError> {
        if factor < 2 {
            return Err(ConfigError::FactorTooSmall { factor });
        }
        if min_capacity == 0 {
            return Err(ConfigError::ZeroMinimumCapacity);
        }
        Ok(Self {
            factor,
            min_capacity,
        })
    }

    /// The capacity multiplier.
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// The capacity of the first implicit allocation.
    pub fn min_capacity(&self) -> usize {
        self.min_capacity
    }

    /// Capacity to grow to from a full block of `current` slots.
    ///
    /// Always strictly greater than `current`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CapacityOverflow`] if the multiplication
    /// overflows `usize`. The error reports the target saturated to
    /// `usize::MAX`.
    pub fn next_capacity(&self, current: usize) -> Result<usize, StorageError> {
        let scaled = current
            .checked_mul(self.factor)
            .ok_or(StorageError::CapacityOverflow {
                requested: current.saturating_mul(self.factor),
            })?;
        Ok(scaled.max(self.min_capacity))
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}
