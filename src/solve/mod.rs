//! Inverse problem: recover one axis from a diffusion coefficient.
//!
//! Responsibilities:
//!
//! - wrap a forward model as a guarded residual (`residual`)
//! - drive the residual to zero (`solver`)
//! - propagate input sigmas to the solved axis (`uncertainty`)

pub mod residual;
pub mod solver;
pub mod uncertainty;

pub use residual::*;
pub use solver::*;
pub use uncertainty::*;
