//! Core types for the Kiln dynamic array.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! error types shared by the storage and array layers and the
//! [`GrowthPolicy`] that decides how capacity expands on implicit growth.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod growth;

pub use error::{ConfigError, StorageError};
pub use growth::GrowthPolicy;
