//! Borrowed and owning iteration, plus collection from iterators.

use std::fmt;
use std::iter::FusedIterator;
use std::mem::ManuallyDrop;
use std::ptr;
use std::slice;

use kiln_storage::RawStorage;

use crate::array::DynamicArray;
use crate::migrate::Migration;

/// Owning iterator over the elements of a [`DynamicArray`].
///
/// Takes over the array's storage block. Elements not yet yielded are
/// dropped with the iterator, then the block is released.
pub struct IntoIter<T> {
    storage: RawStorage<T>,
    start: usize,
    end: usize,
}

impl<T> IntoIter<T> {
    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[start, end)` are live and owned by the iterator.
        unsafe { slice::from_raw_parts(self.storage.offset(self.start), self.end - self.start) }
    }

    /// The elements not yet yielded, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let remaining = self.end - self.start;
        // SAFETY: as for `as_slice`; `&mut self` gives exclusive access.
        unsafe { slice::from_raw_parts_mut(self.storage.offset_mut(self.start), remaining) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: `start < end`, so slot `start` is live; advancing `start`
        // hands its ownership to the caller.
        let item = unsafe { self.storage.offset(self.start).read() };
        self.start += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: slot `end` was the last live slot and leaves the range.
        Some(unsafe { self.storage.offset(self.end).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        // SAFETY: `[start, end)` were never yielded and are dropped once.
        unsafe { ptr::drop_in_place(self.as_mut_slice()) }
    }
}

impl<T, M> IntoIterator for DynamicArray<T, M> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        // The array must not drop its elements: the iterator owns them now.
        let mut array = ManuallyDrop::new(self);
        IntoIter {
            storage: array.storage.take(),
            start: 0,
            end: array.len,
        }
    }
}

impl<'a, T, M> IntoIterator for &'a DynamicArray<T, M> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, M> IntoIterator for &'a mut DynamicArray<T, M> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T, M: Migration<T>> FromIterator<T> for DynamicArray<T, M> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut array = Self::with_capacity(iter.size_hint().0);
        for item in iter {
            array.push_back(item);
        }
        array
    }
}

impl<T, M: Migration<T>> Extend<T> for DynamicArray<T, M> {
    /// Reserves for the iterator's lower size bound only when the spare
    /// capacity cannot hold it, and then grows at least as far as the
    /// growth policy would, so repeated small extends stay amortized O(1).
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let lower = iter.size_hint().0;
        if lower > self.capacity() - self.len {
            let needed = self.len.saturating_add(lower);
            let target = self
                .try_grown_capacity()
                .map_or(needed, |grown| grown.max(needed));
            self.reserve(target);
        }
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<'a, T: Copy + 'a, M: Migration<T>> Extend<&'a T> for DynamicArray<T, M> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::CloningArray;
    use kiln_test_utils::{ledger, Tracked};

    #[test]
    fn borrowed_iteration_visits_in_order() {
        let array: DynamicArray<i32> = (1..=4).collect();
        let seen: Vec<i32> = (&array).into_iter().copied().collect();
        assert_eq!(seen, vec![1, 2, 3, 4]);
        assert_eq!(array.iter().rev().next(), Some(&4));
    }

    #[test]
    fn mutable_iteration_edits_in_place() {
        let mut array: DynamicArray<i32> = (1..=3).collect();
        for value in &mut array {
            *value *= 10;
        }
        assert_eq!(array, [10, 20, 30]);
    }

    #[test]
    fn owning_iteration_yields_from_both_ends() {
        let array: DynamicArray<String> =
            ["a", "b", "c", "d"].map(String::from).into_iter().collect();
        let mut iter = array.into_iter();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next().as_deref(), Some("a"));
        assert_eq!(iter.next_back().as_deref(), Some("d"));
        assert_eq!(iter.as_slice(), ["b", "c"]);
        assert_eq!(iter.size_hint(), (2, Some(2)));
    }

    #[test]
    fn dropping_partial_iterator_drops_the_rest() {
        ledger::reset();
        let array: DynamicArray<Tracked> = (0..5).map(Tracked::new).collect();
        let mut iter = array.into_iter();
        let first = iter.next();
        drop(iter);
        assert_eq!(ledger::snapshot().dropped, 4);
        drop(first);
        assert_eq!(ledger::snapshot().live(), 0);
    }

    #[test]
    fn exhausted_iterator_stays_exhausted() {
        let array: DynamicArray<u8> = (0..1).collect();
        let mut iter = array.into_iter();
        assert_eq!(iter.next(), Some(0));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn collect_sizes_storage_from_hint() {
        let array: DynamicArray<u32> = (0..10).collect();
        assert_eq!(array.capacity(), 10);
        let filtered: DynamicArray<u32> = (0..10).filter(|n| n % 2 == 0).collect();
        assert_eq!(filtered, [0, 2, 4, 6, 8]);
    }

    #[test]
    fn extend_reserves_then_appends() {
        let mut array: DynamicArray<i32> = (0..2).collect();
        array.extend(vec![5, 6, 7]);
        assert_eq!(array.capacity(), 5);
        array.extend(&[8, 9]);
        assert_eq!(array, [0, 1, 5, 6, 7, 8, 9]);
        assert_eq!(array.capacity(), 10);
    }

    #[test]
    fn extend_within_spare_capacity_does_not_reallocate() {
        let mut array: DynamicArray<u8> = DynamicArray::with_capacity(8);
        array.extend([1, 2]);
        let base = array.as_ptr();
        array.extend([3, 4, 5]);
        assert_eq!(array.as_ptr(), base);
        assert_eq!(array.capacity(), 8);
    }

    #[test]
    fn repeated_single_item_extends_grow_geometrically() {
        let mut array: DynamicArray<u32> = DynamicArray::new();
        let mut reallocations = 0;
        let mut base = array.as_ptr();
        for i in 0..1_000 {
            array.extend([i]);
            if array.as_ptr() != base {
                reallocations += 1;
                base = array.as_ptr();
            }
        }
        // 1, 2, 4, ..., 1024.
        assert_eq!(reallocations, 11);
        assert_eq!(array.capacity(), 1_024);
        assert_eq!(array.len(), 1_000);
    }

    #[test]
    fn repeated_extends_clone_linearly_under_duplicate() {
        ledger::reset();
        let mut array: CloningArray<Tracked> = DynamicArray::new();
        for i in 0..1_000 {
            array.extend([Tracked::new(i)]);
        }
        let cloned = ledger::snapshot().cloned;
        assert!(cloned < 2_000, "{cloned} clones for 1000 extends");
        assert_eq!(array[999].value(), 999);
    }

    #[test]
    fn debug_shows_remaining_items() {
        let array: DynamicArray<i32> = (1..=2).collect();
        let mut iter = array.into_iter();
        iter.next();
        assert_eq!(format!("{iter:?}"), "IntoIter([2])");
    }
}
