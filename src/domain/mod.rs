//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - physical constants and the model/axis enums (`PhysicalConstants`, `ModelKind`, `Axis`)
//! - validated inputs (`ShapeParameters`, `DiffusionTarget`, `UncertaintyInputs`)
//! - calculation outputs (`SolveResult`, `Uncertainty`, `SamplePoint`, `SampleSeries`)

pub mod types;

pub use types::*;
