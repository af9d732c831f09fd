//! Input/output helpers.
//!
//! - sweep table exports (CSV) and solve result exports (JSON) (`export`)

pub mod export;

pub use export::*;
