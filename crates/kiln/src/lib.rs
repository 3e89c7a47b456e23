//! Kiln: a contiguous growable array over manually managed raw storage.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Kiln sub-crates. For most users, adding `kiln` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use kiln::prelude::*;
//!
//! let mut array: DynamicArray<i32> = DynamicArray::new();
//! array.push_back(1);
//! array.push_back(2);
//! array.push_back(3);
//! array.insert(1, 99);
//! assert_eq!(array, [1, 99, 2, 3]);
//!
//! array.erase(0);
//! array.resize(5);
//! assert_eq!(array, [99, 2, 3, 0, 0]);
//!
//! // Growth that clones instead of relocating leaves the old block intact
//! // if a clone panics part way.
//! let policy = GrowthPolicy::new(4, 8).unwrap();
//! let mut names: CloningArray<String> = DynamicArray::with_policy(policy);
//! names.push_back("kiln".to_string());
//! assert_eq!(names.capacity(), 8);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `kiln-core` | `GrowthPolicy`, error types |
//! | [`storage`] | `kiln-storage` | `RawStorage`, the uninitialized slot block |
//! | [`array`] | `kiln-array` | `DynamicArray`, migration policies, `IntoIter` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Growth configuration and error types (`kiln-core`).
pub use kiln_core as types;

/// Raw slot storage (`kiln-storage`).
///
/// [`storage::RawStorage`] owns address space for a fixed number of slots
/// and never constructs or drops values in them.
pub use kiln_storage as storage;

/// The dynamic array and its migration policies (`kiln-array`).
///
/// [`array::Relocate`] moves elements bitwise on growth,
/// [`array::Duplicate`] clones them and keeps the old block untouched until
/// the new one is complete.
pub use kiln_array as array;

/// Common imports for typical Kiln usage.
///
/// ```rust
/// use kiln::prelude::*;
/// ```
pub mod prelude {
    pub use kiln_array::{CloningArray, DynamicArray, Duplicate, Migration, Relocate};
    pub use kiln_core::{ConfigError, GrowthPolicy, StorageError};
}
