//! Numerical utilities: finite differences, grids, least squares, and the
//! Levenberg–Marquardt driver used by the inverse solver.

pub mod diff;
pub mod grid;
pub mod lm;
pub mod lstsq;

pub use diff::*;
pub use grid::*;
pub use lm::*;
pub use lstsq::*;
