//! Forward diffusion models.
//!
//! Models are implemented as small, pure functions so that the solver and the
//! comparison driver can stay generic over `ModelKind`.

pub mod model;

pub use model::*;
