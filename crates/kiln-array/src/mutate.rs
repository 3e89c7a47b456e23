//! Element mutation: push, pop, positional insert and erase.

use std::ptr;

use kiln_core::StorageError;
use kiln_storage::RawStorage;

use crate::array::DynamicArray;
use crate::migrate::Migration;

impl<T, M> DynamicArray<T, M> {
    /// Remove and return the last element, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was the last live element and is now outside
        // the live range, so reading it transfers ownership out.
        Some(unsafe { self.storage.offset(self.len).read() })
    }

    /// Remove the element at `position`, shifting the rest left, and return
    /// the position now occupied by its successor (`len()` if it was last).
    ///
    /// # Panics
    ///
    /// Panics if `position >= len()`.
    pub fn erase(&mut self, position: usize) -> usize {
        assert!(
            position < self.len,
            "erase position {position} out of bounds (len {})",
            self.len
        );
        drop(self.remove(position));
        position
    }

    /// Remove and return the element at `position`, shifting the rest left.
    ///
    /// # Panics
    ///
    /// Panics if `position >= len()`.
    pub fn remove(&mut self, position: usize) -> T {
        assert!(
            position < self.len,
            "remove position {position} out of bounds (len {})",
            self.len
        );
        // SAFETY: `position < len`, so the slot is live and the shifted
        // range `(position, len)` lies inside the live range. `ptr::copy`
        // handles the overlap.
        unsafe {
            let hole = self.storage.offset_mut(position);
            let removed = hole.read();
            ptr::copy(hole.add(1), hole, self.len - position - 1);
            self.len -= 1;
            removed
        }
    }

    /// Remove and return the element at `position`, filling the hole with
    /// the last element. Does not preserve order; O(1).
    ///
    /// # Panics
    ///
    /// Panics if `position >= len()`.
    pub fn swap_remove(&mut self, position: usize) -> T {
        assert!(
            position < self.len,
            "swap_remove position {position} out of bounds (len {})",
            self.len
        );
        let last = self.len - 1;
        // SAFETY: both `position` and `last` are live; when they differ the
        // last value is moved into the hole and its slot leaves the live range.
        unsafe {
            let hole = self.storage.offset_mut(position);
            let removed = hole.read();
            if position != last {
                ptr::copy_nonoverlapping(self.storage.offset(last), hole, 1);
            }
            self.len = last;
            removed
        }
    }
}

impl<T, M: Migration<T>> DynamicArray<T, M> {
    /// Append `value` and return a reference to it.
    ///
    /// At full capacity the array grows by its growth policy.
    pub fn push_back(&mut self, value: T) -> &mut T {
        self.emplace_back_with(|| value)
    }

    /// Append `value` without panicking on storage failure.
    ///
    /// # Errors
    ///
    /// Returns the [`StorageError`] if growth was needed and the new block
    /// could not be sized or allocated; the array is unchanged and `value` is
    /// dropped.
    pub fn try_push_back(&mut self, value: T) -> Result<&mut T, StorageError> {
        let index = self.len;
        if self.len == self.capacity() {
            let fresh = RawStorage::try_allocate(self.try_grown_capacity()?)?;
            self.grow_with_element(fresh, index, || value);
        } else {
            self.place_at_end(value);
        }
        // SAFETY: slot `index` was just constructed and is live.
        Ok(unsafe { &mut *self.storage.offset_mut(index) })
    }

    /// Append the value produced by `f` and return a reference to it.
    ///
    /// At full capacity, `f` runs first and its value is written straight
    /// into the new block; the old elements are migrated afterwards. If `f`
    /// or the migration panics, the array is unchanged.
    pub fn emplace_back_with<F>(&mut self, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        let index = self.len;
        if self.len == self.capacity() {
            let fresh = RawStorage::allocate(self.grown_capacity());
            self.grow_with_element(fresh, index, f);
        } else {
            self.place_at_end(f());
        }
        // SAFETY: slot `index` was just constructed and is live.
        unsafe { &mut *self.storage.offset_mut(index) }
    }

    /// Insert `value` at `position`, shifting later elements right, and
    /// return `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position > len()`.
    pub fn insert(&mut self, position: usize, value: T) -> usize {
        self.emplace_with(position, || value)
    }

    /// Insert the value produced by `f` at `position` and return
    /// `position`.
    ///
    /// At full capacity the new element is constructed in the new block
    /// first and the neighbours are migrated around it; a panic leaves the
    /// array unchanged. Below capacity the value is built before anything
    /// shifts.
    ///
    /// # Panics
    ///
    /// Panics if `position > len()`.
    pub fn emplace_with<F>(&mut self, position: usize, f: F) -> usize
    where
        F: FnOnce() -> T,
    {
        assert!(
            position <= self.len,
            "insert position {position} out of bounds (len {})",
            self.len
        );
        if self.len == self.capacity() {
            let fresh = RawStorage::allocate(self.grown_capacity());
            self.grow_with_element(fresh, position, f);
        } else if position == self.len {
            self.place_at_end(f());
        } else {
            let value = f();
            // SAFETY: `len < capacity`, so the shifted range
            // `[position + 1, len + 1)` stays inside the block. After the
            // shift slot `position` holds a stale bitwise copy and is
            // overwritten without dropping it.
            unsafe {
                let slot = self.storage.offset_mut(position);
                ptr::copy(slot, slot.add(1), self.len - position);
                slot.write(value);
            }
            self.len += 1;
        }
        position
    }

    fn place_at_end(&mut self, value: T) {
        debug_assert!(self.len < self.capacity());
        // SAFETY: `len < capacity`, so slot `len` is raw and inside the block.
        unsafe { self.storage.offset_mut(self.len).write(value) };
        self.len += 1;
    }
}
