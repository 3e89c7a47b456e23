//! The [`DynamicArray`] type: construction, assignment, access and drop.
//!
//! Sizing lives in `sizing.rs`, element mutation in `mutate.rs` and
//! iteration in `iter.rs`; they are all inherent impls on the type defined
//! here.

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut, Range};
use std::ptr;
use std::slice;

use kiln_core::{GrowthPolicy, StorageError};
use kiln_storage::RawStorage;

use crate::migrate::{Duplicate, Relocate};

/// A contiguous growable array that manages element lifetimes in raw
/// storage.
///
/// Slots `[0, len)` of the storage hold live values; slots
/// `[len, capacity)` are uninitialized. The array never allocates itself:
/// every block comes from [`RawStorage`], and the array only constructs and
/// destroys values inside it.
///
/// `M` selects how elements move to a new block when the array grows: see
/// [`Relocate`] (default) and [`Duplicate`].
///
/// # Failure guarantees
///
/// - Growth (`reserve`, `push_back`, `insert` at full capacity) builds the
///   new block completely before retiring the old one, so a panic while
///   constructing the new element or migrating leaves the array unchanged.
/// - `clone_from` onto an array too small for the source builds a full copy
///   first and is likewise all-or-nothing.
/// - In-place paths (`clone_from` reusing storage, `resize_with`) only
///   promise that nothing leaks and nothing is dropped twice.
pub struct DynamicArray<T, M = Relocate> {
    pub(crate) storage: RawStorage<T>,
    pub(crate) len: usize,
    pub(crate) growth: GrowthPolicy,
    pub(crate) _migration: PhantomData<fn() -> M>,
}

/// A [`DynamicArray`] that grows by cloning, leaving its elements intact if a
/// clone panics mid-growth.
pub type CloningArray<T> = DynamicArray<T, Duplicate>;

impl<T, M> DynamicArray<T, M> {
    /// Create an empty array. Does not allocate.
    pub const fn new() -> Self {
        Self::with_policy(GrowthPolicy::DEFAULT)
    }

    /// Create an empty array that grows according to `growth`.
    pub const fn with_policy(growth: GrowthPolicy) -> Self {
        Self {
            storage: RawStorage::new(),
            len: 0,
            growth,
            _migration: PhantomData,
        }
    }

    /// Create an empty array with exactly `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if the block size overflows `isize::MAX`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_storage(RawStorage::allocate(capacity))
    }

    /// Fallible form of [`with_capacity`](Self::with_capacity).
    ///
    /// # Errors
    ///
    /// Returns the [`StorageError`] reported by the storage layer.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, StorageError> {
        RawStorage::try_allocate(capacity).map(Self::from_storage)
    }

    /// Create an array of `len` default values, with capacity exactly `len`.
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        Self::with_len_by(len, T::default)
    }

    /// Create an array of `len` values produced by `f`, with capacity
    /// exactly `len`.
    ///
    /// If `f` panics, the values built so far are dropped and the block is
    /// freed.
    pub fn with_len_by<F>(len: usize, f: F) -> Self
    where
        F: FnMut() -> T,
    {
        let mut array = Self::with_capacity(len);
        array.fill_to(len, f);
        array
    }

    fn from_storage(storage: RawStorage<T>) -> Self {
        Self {
            storage,
            len: 0,
            growth: GrowthPolicy::DEFAULT,
            _migration: PhantomData,
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the current storage block.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// The policy applied when a push or insert finds the array full.
    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth
    }

    /// Base address of the live range.
    ///
    /// Invalidated by any operation that grows or shifts elements.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Mutable base address of the live range.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.storage.as_mut_ptr()
    }

    /// `[begin, end)` addresses of the live range.
    pub fn as_ptr_range(&self) -> Range<*const T> {
        self.as_slice().as_ptr_range()
    }

    /// The live elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` are live and the block is aligned for `T`.
        unsafe { slice::from_raw_parts(self.storage.as_ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as for `as_slice`; `&mut self` gives exclusive access.
        unsafe { slice::from_raw_parts_mut(self.storage.as_mut_ptr(), self.len) }
    }

    /// Exchange contents, capacity and growth policy with `other` in
    /// constant time.
    pub fn swap(&mut self, other: &mut Self) {
        self.storage.swap(&mut other.storage);
        mem::swap(&mut self.len, &mut other.len);
        mem::swap(&mut self.growth, &mut other.growth);
    }

    /// Take over `source`'s elements in constant time, leaving `source`
    /// empty.
    ///
    /// The two arrays swap state, then `source` is cleared: the elements
    /// `self` held before are dropped and `source` keeps the storage block
    /// `self` used to own.
    pub fn move_from(&mut self, source: &mut Self) {
        self.swap(source);
        source.clear();
    }

    /// Construct values from `f` into the raw slots `[len, target)`.
    ///
    /// `len` advances after each write, so a panic in `f` leaves the array
    /// valid with the values built so far.
    pub(crate) fn fill_to<F>(&mut self, target: usize, mut f: F)
    where
        F: FnMut() -> T,
    {
        debug_assert!(target <= self.capacity());
        while self.len < target {
            let value = f();
            // SAFETY: `len < target <= capacity`, and slot `len` is raw.
            unsafe { self.storage.offset_mut(self.len).write(value) };
            self.len += 1;
        }
    }

    /// Clone `items` into the raw slots starting at `len`.
    pub(crate) fn clone_tail(&mut self, items: &[T])
    where
        T: Clone,
    {
        debug_assert!(self.len + items.len() <= self.capacity());
        for item in items {
            let value = item.clone();
            // SAFETY: the caller reserved room for every item, so slot `len`
            // is raw and inside the block.
            unsafe { self.storage.offset_mut(self.len).write(value) };
            self.len += 1;
        }
    }
}

impl<T, M> Drop for DynamicArray<T, M> {
    fn drop(&mut self) {
        // SAFETY: `[0, len)` are live and dropped exactly once here; the
        // storage field releases the block afterwards.
        unsafe { ptr::drop_in_place(self.as_mut_slice()) }
    }
}

impl<T, M> Default for DynamicArray<T, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, M> Clone for DynamicArray<T, M> {
    /// Deep copy into a new block of exactly `self.len()` slots.
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity(self.len);
        copy.growth = self.growth;
        copy.clone_tail(self.as_slice());
        copy
    }

    /// Copy assignment.
    ///
    /// If `source` does not fit in the current capacity, a full copy is
    /// built and swapped in, so a panicking clone leaves `self` untouched.
    /// Otherwise the storage is reused: the common prefix is assigned with
    /// `clone_from`, then the tail is dropped or cloned in. A panic on the
    /// reuse path leaves `self` valid but with unspecified contents.
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.capacity() {
            let mut copy = source.clone();
            self.swap(&mut copy);
            return;
        }
        self.growth = source.growth;
        let shared = self.len.min(source.len);
        self.as_mut_slice()[..shared].clone_from_slice(&source.as_slice()[..shared]);
        if source.len < self.len {
            self.truncate(source.len);
        } else {
            self.clone_tail(&source.as_slice()[shared..]);
        }
    }
}

impl<T, M> Deref for DynamicArray<T, M> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, M> DerefMut for DynamicArray<T, M> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, M> AsRef<[T]> for DynamicArray<T, M> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, M> AsMut<[T]> for DynamicArray<T, M> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug, M> fmt::Debug for DynamicArray<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, M, N> PartialEq<DynamicArray<T, N>> for DynamicArray<T, M> {
    fn eq(&self, other: &DynamicArray<T, N>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, M> Eq for DynamicArray<T, M> {}

impl<T: PartialEq, M> PartialEq<[T]> for DynamicArray<T, M> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, M> PartialEq<&[T]> for DynamicArray<T, M> {
    fn eq(&self, other: &&[T]) -> bool {
        self.as_slice() == *other
    }
}

impl<T: PartialEq, M, const N: usize> PartialEq<[T; N]> for DynamicArray<T, M> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}
