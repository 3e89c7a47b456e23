//! Element types with observable lifecycles.

use crate::ledger;

/// An element that reports construction, cloning and dropping to the
/// thread-local [`ledger`](crate::ledger).
///
/// Equality and ordering compare only the payload value.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tracked {
    value: u64,
}

impl Tracked {
    pub fn new(value: u64) -> Self {
        ledger::record_created();
        Self { value }
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        ledger::record_cloned();
        Self { value: self.value }
    }
}

impl Default for Tracked {
    fn default() -> Self {
        ledger::record_defaulted();
        Self { value: 0 }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        ledger::record_dropped();
    }
}

/// A payload with no `Clone` impl.
///
/// Holds a heap allocation so that a double drop or a leak shows up under
/// Miri and sanitizers.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MoveOnly(Box<u64>);

impl MoveOnly {
    pub fn new(value: u64) -> Self {
        Self(Box::new(value))
    }

    pub fn value(&self) -> u64 {
        *self.0
    }
}

/// Collect the payloads of a slice of [`Tracked`] for assertions.
pub fn values(items: &[Tracked]) -> Vec<u64> {
    items.iter().map(Tracked::value).collect()
}
