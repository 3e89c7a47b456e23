//! Benchmark workloads for the Kiln dynamic array.
//!
//! Shared by the criterion benches so every container is driven through
//! the same sequence of operations:
//!
//! - [`Payload`]: a 64-byte element with a non-trivial clone
//! - [`fill_by_push`]: append `n` elements starting from an empty array
//! - [`fill_by_front_insert`]: insert `n` elements at position 0
//! - [`churn`]: interleaved insert/erase at a fixed stride

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use kiln_array::{DynamicArray, Migration};
use kiln_core::GrowthPolicy;

/// Element sizes used across the benches.
pub const SIZES: [usize; 3] = [64, 1_024, 16_384];

/// A cache-line-sized element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Payload {
    /// Sequence number assigned by the workload.
    pub id: u64,
    /// Filler so the element spans a cache line.
    pub data: [u64; 7],
}

impl Payload {
    /// Build a payload whose filler is derived from `id`.
    pub fn new(id: u64) -> Self {
        let mut data = [0u64; 7];
        for (i, slot) in data.iter_mut().enumerate() {
            *slot = id.wrapping_mul(31).wrapping_add(i as u64);
        }
        Self { id, data }
    }
}

/// Append `n` payloads to an empty array grown by `policy`.
pub fn fill_by_push<M: Migration<Payload>>(
    n: usize,
    policy: GrowthPolicy,
) -> DynamicArray<Payload, M> {
    let mut array = DynamicArray::with_policy(policy);
    for i in 0..n as u64 {
        array.push_back(Payload::new(i));
    }
    array
}

/// Insert `n` integers one at a time at the front.
///
/// Quadratic in `n`; keep `n` small.
pub fn fill_by_front_insert(n: usize) -> DynamicArray<u64> {
    let mut array: DynamicArray<u64> = DynamicArray::new();
    for i in 0..n as u64 {
        array.insert(0, i);
    }
    array
}

/// Alternate an insert and an erase every `stride` positions.
///
/// Leaves the length unchanged and returns the sum of the contents so the
/// work cannot be optimised away.
pub fn churn(array: &mut DynamicArray<u64>, stride: usize) -> u64 {
    let stride = stride.max(1);
    let mut position = 0;
    while position < array.len() {
        array.insert(position, position as u64);
        array.erase(position + 1);
        position += stride;
    }
    array.iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_array::{Duplicate, Relocate};

    #[test]
    fn push_workload_fills_in_order() {
        let array: DynamicArray<Payload, Relocate> = fill_by_push(100, GrowthPolicy::default());
        assert_eq!(array.len(), 100);
        assert_eq!(array[42], Payload::new(42));
        let cloning: DynamicArray<Payload, Duplicate> = fill_by_push(100, GrowthPolicy::default());
        assert_eq!(array, cloning);
    }

    #[test]
    fn front_insert_reverses() {
        let array = fill_by_front_insert(5);
        assert_eq!(array, [4, 3, 2, 1, 0]);
    }

    #[test]
    fn churn_keeps_length() {
        let mut array: DynamicArray<u64> = (0..20).collect();
        let sum = churn(&mut array, 3);
        assert_eq!(array.len(), 20);
        assert_eq!(sum, array.iter().sum::<u64>());
    }
}
