//! Reporting utilities: text rendering of solve results, comparisons and sweeps.

pub mod format;

pub use format::*;
