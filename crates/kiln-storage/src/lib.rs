//! Uninitialized, correctly aligned storage blocks for the Kiln array.
//!
//! [`RawStorage`] owns address space for a fixed number of `T` slots and
//! nothing else: it never constructs, reads or drops a `T`. Deciding which
//! slots hold live values is the owner's job (see `kiln-array`), which is
//! why storage is movable but deliberately not `Clone`.
//!
//! This crate is one of two in the workspace that may contain `unsafe`
//! code (along with `kiln-array`). All of it lives in `raw.rs`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

mod raw;

pub use kiln_core::StorageError;
pub use raw::RawStorage;
