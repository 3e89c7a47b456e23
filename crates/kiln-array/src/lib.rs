//! A contiguous growable array over manually managed raw storage.
//!
//! [`DynamicArray`] owns a [`RawStorage`](kiln_storage::RawStorage) block
//! and a live length. The storage layer only hands out address space; this
//! crate decides when values are constructed in it and when they are
//! destroyed.
//!
//! # Layout
//!
//! ```text
//! DynamicArray<T, M>
//! ├── RawStorage<T>          capacity slots, [0, len) live, [len, capacity) raw
//! ├── len
//! ├── GrowthPolicy           next capacity on implicit growth (default 2x, min 1)
//! └── M: Migration<T>        Relocate (bitwise move) | Duplicate (clone, keep source)
//! ```
//!
//! Growth always builds a complete new block before retiring the old one.
//! See [`migrate`] for how the migration policy affects what a panic during
//! growth can disturb.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![allow(unsafe_code)]

mod array;
pub mod iter;
pub mod migrate;
mod mutate;
mod sizing;

pub use array::{CloningArray, DynamicArray};
pub use iter::IntoIter;
pub use kiln_core::{ConfigError, GrowthPolicy, StorageError};
pub use migrate::{Duplicate, Migration, Relocate};
