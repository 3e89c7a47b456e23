//! Capacity management: reserve, resize, truncate and the growth core
//! shared with the mutation paths.

use std::ptr;

use kiln_core::StorageError;
use kiln_storage::RawStorage;
use log::debug;

use crate::array::DynamicArray;
use crate::migrate::{InitializedRun, Migration};

impl<T, M> DynamicArray<T, M> {
    /// Drop every element past the first `new_len`. Capacity is unchanged.
    ///
    /// No-op if `new_len >= len()`.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let tail = self.len - new_len;
        // Shorten first: if a drop panics the rest leak rather than being
        // dropped twice.
        self.len = new_len;
        // SAFETY: `[new_len, new_len + tail)` were live and are now outside
        // the live range, so they are dropped exactly once.
        unsafe {
            let first = self.storage.offset_mut(new_len);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, tail));
        }
    }

    /// Drop every element. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Capacity the growth policy assigns to the next implicit growth.
    pub(crate) fn try_grown_capacity(&self) -> Result<usize, StorageError> {
        self.growth.next_capacity(self.capacity())
    }

    pub(crate) fn grown_capacity(&self) -> usize {
        match self.try_grown_capacity() {
            Ok(capacity) => capacity,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T, M: Migration<T>> DynamicArray<T, M> {
    /// Ensure room for at least `new_capacity` elements in total.
    ///
    /// No-op if the capacity is already large enough; never shrinks. When it
    /// grows, the new block is exactly `new_capacity` slots and the elements
    /// are migrated with `M`, keeping their order and values.
    ///
    /// # Panics
    ///
    /// Panics if the block size overflows `isize::MAX`.
    pub fn reserve(&mut self, new_capacity: usize) {
        if new_capacity <= self.capacity() {
            return;
        }
        let fresh = RawStorage::allocate(new_capacity);
        self.migrate_into(fresh);
    }

    /// Fallible form of [`reserve`](Self::reserve).
    ///
    /// # Errors
    ///
    /// Returns the [`StorageError`] from the storage layer; the array is
    /// unchanged.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), StorageError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        let fresh = RawStorage::try_allocate(new_capacity)?;
        self.migrate_into(fresh);
        Ok(())
    }

    /// Resize to `new_len`, filling new slots with `T::default()`.
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Resize to `new_len`, filling new slots with values from `f`.
    ///
    /// Growing reserves exactly `new_len` slots before constructing; a panic
    /// in `f` keeps the values built so far. Shrinking drops the tail and
    /// keeps the capacity.
    pub fn resize_with<F>(&mut self, new_len: usize, f: F)
    where
        F: FnMut() -> T,
    {
        if new_len > self.len {
            self.reserve(new_len);
            self.fill_to(new_len, f);
        } else {
            self.truncate(new_len);
        }
    }

    /// Migrate every live element into `fresh` and adopt it.
    fn migrate_into(&mut self, mut fresh: RawStorage<T>) {
        debug_assert!(fresh.capacity() >= self.len);
        self.log_growth(fresh.capacity());
        // SAFETY: `[0, len)` are live in the current block; `fresh` is a
        // distinct block with at least `len` raw slots.
        unsafe { M::migrate(self.storage.as_ptr(), fresh.as_mut_ptr(), self.len) };
        // SAFETY: the migration filled `[0, len)` of `fresh`.
        unsafe { self.adopt(fresh, self.len) };
    }

    /// Grow into `fresh` while constructing one new element at `index`.
    ///
    /// The new element is built first, then the prefix `[0, index)` and the
    /// suffix `[index, len)` are migrated around it. A panic at any step
    /// drops only what was built in `fresh`; the current block is untouched.
    pub(crate) fn grow_with_element<F>(&mut self, mut fresh: RawStorage<T>, index: usize, f: F)
    where
        F: FnOnce() -> T,
    {
        debug_assert!(index <= self.len);
        debug_assert!(fresh.capacity() > self.len);
        self.log_growth(fresh.capacity());
        let old = self.storage.as_ptr();
        let base = fresh.as_mut_ptr();
        // SAFETY: `index <= len < fresh.capacity()`, so every destination
        // range below lies inside `fresh`; every source range lies inside
        // the live range of the current block. Each built range is covered
        // by a guard until the whole block is complete.
        unsafe {
            base.add(index).write(f());
            let placed = InitializedRun::covering(base.add(index), 1);
            M::migrate(old, base, index);
            let prefix = InitializedRun::covering(base, index);
            M::migrate(old.add(index), base.add(index + 1), self.len - index);
            prefix.disarm();
            placed.disarm();
            self.adopt(fresh, self.len + 1);
        }
    }

    /// Swap in a fully built block holding `new_len` live elements and
    /// retire the old block's elements.
    ///
    /// # Safety
    ///
    /// `[0, new_len)` of `fresh` must be live, built from the current
    /// elements by `M`.
    unsafe fn adopt(&mut self, mut fresh: RawStorage<T>, new_len: usize) {
        let retired = self.len;
        self.storage.swap(&mut fresh);
        self.len = new_len;
        if !M::VACATES_SOURCE {
            // SAFETY: `fresh` now holds the old block, whose `[0, retired)`
            // are still live after a non-vacating migration.
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(fresh.as_mut_ptr(), retired));
            }
        }
        // `fresh` drops here and releases the old block.
    }

    fn log_growth(&self, new_capacity: usize) {
        debug!(
            "growing {} array from {} to {} slots ({} live, {})",
            std::any::type_name::<T>(),
            self.capacity(),
            new_capacity,
            self.len,
            M::NAME
        );
    }
}
