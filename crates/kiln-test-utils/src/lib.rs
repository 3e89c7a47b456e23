//! Test utilities and instrumented element types for Kiln development.
//!
//! Provides [`Tracked`], an element type that reports every construction,
//! clone and drop to a per-thread [`ledger`], with injectable clone and
//! default-construction failures for exercising rollback paths. Also
//! provides [`MoveOnly`] for code paths that must work without `Clone`.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod elements;
pub mod ledger;

pub use elements::{values, MoveOnly, Tracked};
pub use ledger::LedgerSnapshot;

/// Install a stderr logger for the current test binary.
///
/// Defaults to `warn`; set `RUST_LOG=trace` to see storage and growth
/// events. Safe to call from every test: only the first call installs.
pub fn init_logging() {
    let _ = simple_logger::SimpleLogger::new()
        .without_timestamps()
        .with_level(log::LevelFilter::Warn)
        .env()
        .init();
}
