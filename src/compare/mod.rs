//! Model comparison and sampling.
//!
//! - sweep a free axis (or the aspect ratio) and evaluate every model pointwise
//! - compare the three models at a single shape
//! - trace the solved axis across a range of target coefficients

pub mod sample;

pub use sample::*;
