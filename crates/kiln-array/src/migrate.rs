//! Migration policies: how live elements reach a freshly allocated block.
//!
//! Growth never edits the old block. It builds the new one to completion and
//! only then retires the old elements, so the choice of how to transfer an
//! element decides what a failure mid-transfer can damage:
//!
//! - [`Relocate`] moves each value bitwise. Moves cannot fail in Rust, so
//!   this is always safe and is the default for every `T`.
//! - [`Duplicate`] clones each value and leaves the source untouched. A
//!   panicking clone unwinds only the clones already built; the array that
//!   was growing still holds every original element.
//!
//! The policy is a type parameter of `DynamicArray`, resolved once per
//! element type, so each growth path is a single static code path.

use std::mem;
use std::ptr;

/// Strategy for transferring live elements into uninitialized slots.
///
/// # Safety
///
/// Implementations must uphold the contract of [`migrate`](Self::migrate)
/// and report [`VACATES_SOURCE`](Self::VACATES_SOURCE) truthfully: the
/// array drops the source elements after a successful migration exactly
/// when it is `false`.
pub unsafe trait Migration<T> {
    /// Whether a successful migration leaves the source slots logically
    /// uninitialized (their values now live only in the destination).
    const VACATES_SOURCE: bool;

    /// Name used in growth log events.
    const NAME: &'static str;

    /// Fill `count` uninitialized slots at `dst` from the live values at
    /// `src`.
    ///
    /// If this panics, every slot it wrote at `dst` has been dropped again
    /// and `src` is unchanged.
    ///
    /// # Safety
    ///
    /// `src` must point to `count` live values, `dst` to `count` writable
    /// uninitialized slots, and the two ranges must not overlap.
    unsafe fn migrate(src: *const T, dst: *mut T, count: usize);
}

/// Move elements bitwise into the new block. Infallible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Relocate;

// SAFETY: a bitwise copy transfers ownership; the source slots must not be
// dropped afterwards, which `VACATES_SOURCE = true` tells the array.
unsafe impl<T> Migration<T> for Relocate {
    const VACATES_SOURCE: bool = true;
    const NAME: &'static str = "relocate";

    #[inline]
    unsafe fn migrate(src: *const T, dst: *mut T, count: usize) {
        // SAFETY: caller guarantees valid, non-overlapping ranges of `count`.
        unsafe { ptr::copy_nonoverlapping(src, dst, count) }
    }
}

/// Clone elements into the new block, keeping the originals intact until
/// the whole block is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Duplicate;

// SAFETY: clones are independent values; the originals stay live and are
// dropped by the array afterwards (`VACATES_SOURCE = false`). A panicking
// clone is contained by the `InitializedRun` guard.
unsafe impl<T: Clone> Migration<T> for Duplicate {
    const VACATES_SOURCE: bool = false;
    const NAME: &'static str = "duplicate";

    unsafe fn migrate(src: *const T, dst: *mut T, count: usize) {
        let mut built = InitializedRun::empty(dst);
        for i in 0..count {
            // SAFETY: `i < count`, so both slots are in range; `src + i` is live.
            unsafe { dst.add(i).write((*src.add(i)).clone()) };
            built.extend_by_one();
        }
        built.disarm();
    }
}

/// A run of constructed values in a block that has not been published yet.
///
/// Dropping the guard drops the run. Growth paths hold one per
/// successfully built range and disarm them all once the block is complete.
pub(crate) struct InitializedRun<T> {
    start: *mut T,
    len: usize,
}

impl<T> InitializedRun<T> {
    /// An empty run beginning at `start`.
    pub(crate) fn empty(start: *mut T) -> Self {
        Self { start, len: 0 }
    }

    /// A run over `len` values already constructed at `start`.
    ///
    /// # Safety
    ///
    /// `start..start + len` must be live values owned by nobody else.
    pub(crate) unsafe fn covering(start: *mut T, len: usize) -> Self {
        Self { start, len }
    }

    /// Record that the slot just past the run has been constructed.
    pub(crate) fn extend_by_one(&mut self) {
        self.len += 1;
    }

    /// Hand ownership of the run to the new block.
    pub(crate) fn disarm(self) {
        mem::forget(self);
    }
}

impl<T> Drop for InitializedRun<T> {
    fn drop(&mut self) {
        // SAFETY: the run only ever covers values constructed and not yet
        // published, per `covering` and `extend_by_one`.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.start, self.len)) }
    }
}
