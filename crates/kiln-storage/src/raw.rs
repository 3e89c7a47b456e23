//! Raw block allocation and slot addressing.
//!
//! Every `unsafe` operation here carries a `// SAFETY:` comment. The block
//! layout is always `Layout::array::<T>(capacity)`, recomputed on release
//! from the stored capacity.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};
use std::ptr::NonNull;
use std::slice;

use kiln_core::StorageError;
use log::trace;

/// A block of uninitialized memory sized and aligned for `capacity` values
/// of `T`.
///
/// No `T` is ever constructed or dropped by this type. Dropping a
/// `RawStorage` only returns the block to the allocator, so the owner must
/// destroy any values it placed in the slots first.
///
/// A zero capacity, or a zero-sized `T`, never touches the allocator; the
/// base address is then dangling but well aligned.
pub struct RawStorage<T> {
    ptr: NonNull<T>,
    capacity: usize,
    _owns: PhantomData<T>,
}

// SAFETY: `RawStorage` uniquely owns its block, like `Box<[MaybeUninit<T>]>`.
// Sending it sends the (possibly live) `T` values the owner put there.
unsafe impl<T: Send> Send for RawStorage<T> {}
// SAFETY: shared access only hands out `&MaybeUninit<T>` and `*const T`.
unsafe impl<T: Sync> Sync for RawStorage<T> {}

impl<T> RawStorage<T> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// The empty block: zero capacity, no allocation.
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
            _owns: PhantomData,
        }
    }

    /// Allocate a block for `capacity` slots.
    ///
    /// The memory is left uninitialized. A zero `capacity` returns the empty
    /// block without allocating.
    ///
    /// # Panics
    ///
    /// Panics if `capacity * size_of::<T>()` exceeds `isize::MAX`. Allocator
    /// failure is routed to [`std::alloc::handle_alloc_error`].
    pub fn allocate(capacity: usize) -> Self {
        if capacity == 0 || Self::IS_ZST {
            return Self::unallocated(capacity);
        }
        let layout = match Self::layout_for(capacity) {
            Ok(layout) => layout,
            Err(err) => panic!("{err}"),
        };
        match Self::allocate_block(layout) {
            Some(ptr) => Self::from_block(ptr, capacity),
            None => alloc::handle_alloc_error(layout),
        }
    }

    /// Fallible form of [`allocate`](Self::allocate).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CapacityOverflow`] if the byte size does not
    /// fit in `isize::MAX`, or [`StorageError::AllocationFailed`] if the
    /// allocator refuses the request.
    pub fn try_allocate(capacity: usize) -> Result<Self, StorageError> {
        if capacity == 0 || Self::IS_ZST {
            return Ok(Self::unallocated(capacity));
        }
        let layout = Self::layout_for(capacity)?;
        let ptr = Self::allocate_block(layout).ok_or(StorageError::AllocationFailed {
            bytes: layout.size(),
            align: layout.align(),
        })?;
        Ok(Self::from_block(ptr, capacity))
    }

    /// Return the block to the allocator and become the empty block.
    ///
    /// Any values still living in the slots are leaked, never dropped.
    /// Releasing the empty block is a no-op, so calling this twice is fine.
    pub fn release(&mut self) {
        if self.capacity != 0 && !Self::IS_ZST {
            // SAFETY: the block was allocated with `Layout::array::<T>(capacity)`,
            // which succeeded at the time, so the same size and alignment are valid.
            unsafe {
                let layout = Layout::from_size_align_unchecked(
                    mem::size_of::<T>() * self.capacity,
                    mem::align_of::<T>(),
                );
                alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout);
            }
            trace!(
                "released {} slots of {} at {:p}",
                self.capacity,
                std::any::type_name::<T>(),
                self.ptr
            );
        }
        self.ptr = NonNull::dangling();
        self.capacity = 0;
    }

    /// Move the block out, leaving `self` as the empty block.
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }

    /// Exchange blocks and capacities with `other` in constant time.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.capacity, &mut other.capacity);
    }

    /// Number of `T` slots in the block.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the block has zero slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.capacity == 0
    }

    /// Size of the block in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.capacity * mem::size_of::<T>()
    }

    /// Base address of the block.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Mutable base address of the block.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Address of slot `index`.
    ///
    /// # Safety
    ///
    /// `index <= capacity`. The one-past-the-end address is allowed but must
    /// not be dereferenced.
    #[inline]
    pub unsafe fn offset(&self, index: usize) -> *const T {
        debug_assert!(
            index <= self.capacity,
            "slot offset {index} beyond capacity {}",
            self.capacity
        );
        // SAFETY: caller guarantees `index <= capacity`, so the result stays
        // within (or one past) the allocated block.
        unsafe { self.ptr.as_ptr().add(index) }
    }

    /// Mutable address of slot `index`.
    ///
    /// # Safety
    ///
    /// Same contract as [`offset`](Self::offset).
    #[inline]
    pub unsafe fn offset_mut(&mut self, index: usize) -> *mut T {
        debug_assert!(
            index <= self.capacity,
            "slot offset {index} beyond capacity {}",
            self.capacity
        );
        // SAFETY: as for `offset`.
        unsafe { self.ptr.as_ptr().add(index) }
    }

    /// The whole block as possibly-uninitialized slots.
    pub fn as_uninit_slice(&self) -> &[MaybeUninit<T>] {
        // SAFETY: the block holds `capacity` slots of `T`, and `MaybeUninit<T>`
        // has the same layout with no validity requirement. A dangling base
        // is fine for the empty slice and for zero-sized `T`.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr().cast(), self.capacity) }
    }

    /// The whole block as mutable possibly-uninitialized slots.
    pub fn as_uninit_slice_mut(&mut self) -> &mut [MaybeUninit<T>] {
        // SAFETY: as for `as_uninit_slice`; `&mut self` gives exclusive access.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr().cast(), self.capacity) }
    }

    /// Slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity`.
    pub fn at(&self, index: usize) -> &MaybeUninit<T> {
        &self.as_uninit_slice()[index]
    }

    /// Mutable slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity`.
    pub fn at_mut(&mut self, index: usize) -> &mut MaybeUninit<T> {
        &mut self.as_uninit_slice_mut()[index]
    }

    fn unallocated(capacity: usize) -> Self {
        // Zero-sized values need no memory, so any recorded capacity is real.
        Self {
            ptr: NonNull::dangling(),
            capacity: if Self::IS_ZST { capacity } else { 0 },
            _owns: PhantomData,
        }
    }

    fn from_block(ptr: NonNull<T>, capacity: usize) -> Self {
        trace!(
            "allocated {} slots of {} at {:p}",
            capacity,
            std::any::type_name::<T>(),
            ptr
        );
        Self {
            ptr,
            capacity,
            _owns: PhantomData,
        }
    }

    fn layout_for(capacity: usize) -> Result<Layout, StorageError> {
        Layout::array::<T>(capacity).map_err(|_| StorageError::CapacityOverflow {
            requested: capacity,
        })
    }

    fn allocate_block(layout: Layout) -> Option<NonNull<T>> {
        debug_assert!(layout.size() != 0);
        // SAFETY: callers only pass layouts for a non-zero capacity of a
        // non-zero-sized `T`, so `layout.size() > 0`.
        let raw = unsafe { alloc::alloc(layout) };
        NonNull::new(raw.cast::<T>())
    }
}

impl<T> Default for RawStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for RawStorage<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> fmt::Debug for RawStorage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawStorage")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_test_utils::{ledger, Tracked};

    #[repr(align(64))]
    #[allow(dead_code)]
    struct CacheLine([u8; 64]);

    #[test]
    fn zero_capacity_does_not_allocate() {
        let storage = RawStorage::<u64>::allocate(0);
        assert_eq!(storage.capacity(), 0);
        assert!(storage.is_empty());
        assert_eq!(storage.as_ptr(), NonNull::<u64>::dangling().as_ptr());
        assert!(storage.as_uninit_slice().is_empty());
    }

    #[test]
    fn allocates_requested_slots() {
        let storage = RawStorage::<u32>::allocate(16);
        assert_eq!(storage.capacity(), 16);
        assert_eq!(storage.memory_bytes(), 64);
        assert_eq!(storage.as_uninit_slice().len(), 16);
    }

    #[test]
    fn block_is_aligned_for_t() {
        let storage = RawStorage::<CacheLine>::allocate(3);
        assert_eq!(storage.as_ptr() as usize % 64, 0);
        assert_eq!(storage.memory_bytes(), 3 * 64);
    }

    #[test]
    fn slots_round_trip_written_values() {
        let mut storage = RawStorage::<u64>::allocate(4);
        for i in 0..4 {
            storage.at_mut(i).write(i as u64 * 10);
        }
        // SAFETY: every slot was written above.
        let values: Vec<u64> = (0..4)
            .map(|i| unsafe { storage.at(i).assume_init_read() })
            .collect();
        assert_eq!(values, vec![0, 10, 20, 30]);
    }

    #[test]
    fn offset_matches_slot_address() {
        let mut storage = RawStorage::<u16>::allocate(8);
        // SAFETY: 3 and 8 are both within `0..=capacity`.
        unsafe {
            assert_eq!(storage.offset(3), storage.at(3).as_ptr());
            assert_eq!(storage.offset_mut(8), storage.as_mut_ptr().add(8));
        }
    }

    #[test]
    fn dropping_storage_never_drops_contents() {
        ledger::reset();
        {
            let mut storage = RawStorage::<Tracked>::allocate(2);
            storage.at_mut(0).write(Tracked::new(1));
            storage.at_mut(1).write(Tracked::new(2));
            // SAFETY: slot 0 was initialized above and is not used again.
            unsafe { storage.at_mut(0).assume_init_drop() };
            // Slot 1 is deliberately left live: storage must not touch it.
        }
        let snap = ledger::snapshot();
        assert_eq!(snap.created, 2);
        assert_eq!(snap.dropped, 1);
    }

    #[test]
    fn take_leaves_source_empty() {
        let mut source = RawStorage::<u8>::allocate(32);
        let base = source.as_ptr();
        let taken = source.take();
        assert_eq!(taken.capacity(), 32);
        assert_eq!(taken.as_ptr(), base);
        assert_eq!(source.capacity(), 0);
        assert!(source.is_empty());
    }

    #[test]
    fn swap_exchanges_blocks() {
        let mut a = RawStorage::<u64>::allocate(2);
        let mut b = RawStorage::<u64>::allocate(5);
        let (pa, pb) = (a.as_ptr(), b.as_ptr());
        a.swap(&mut b);
        assert_eq!((a.capacity(), a.as_ptr()), (5, pb));
        assert_eq!((b.capacity(), b.as_ptr()), (2, pa));
    }

    #[test]
    fn release_is_idempotent() {
        let mut storage = RawStorage::<u64>::allocate(10);
        storage.release();
        assert_eq!(storage.capacity(), 0);
        storage.release();
        assert_eq!(storage.capacity(), 0);
    }

    #[test]
    fn try_allocate_reports_overflow() {
        let err = RawStorage::<u64>::try_allocate(usize::MAX).unwrap_err();
        assert_eq!(
            err,
            StorageError::CapacityOverflow {
                requested: usize::MAX
            }
        );
    }

    #[test]
    fn try_allocate_succeeds_for_sane_sizes() {
        let storage = RawStorage::<u64>::try_allocate(100).unwrap();
        assert_eq!(storage.capacity(), 100);
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn allocate_panics_on_overflow() {
        let _ = RawStorage::<u32>::allocate(usize::MAX / 2);
    }

    #[test]
    #[should_panic]
    fn at_out_of_bounds_panics() {
        let storage = RawStorage::<u32>::allocate(4);
        let _ = storage.at(4);
    }

    #[test]
    fn zero_sized_types_record_capacity() {
        let storage = RawStorage::<()>::allocate(1_000);
        assert_eq!(storage.capacity(), 1_000);
        assert_eq!(storage.memory_bytes(), 0);
        let fallible = RawStorage::<()>::try_allocate(usize::MAX).unwrap();
        assert_eq!(fallible.capacity(), usize::MAX);
    }

    #[test]
    fn debug_does_not_read_slots() {
        let storage = RawStorage::<String>::allocate(1);
        let rendered = format!("{storage:?}");
        assert!(rendered.contains("capacity: 1"));
    }
}
