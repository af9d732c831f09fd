//! `ellipsoid-diffusion` library crate.
//!
//! Estimates one semi-axis of a prolate or oblate ellipsoid from its
//! translational diffusion coefficient, under three hydrodynamic models.
//!
//! The binary (`ediff`) is a thin wrapper around this library so that:
//!
//! - the forward models and the solver are testable without spawning processes
//! - the CLI and the TUI share one pipeline

pub mod app;
pub mod cli;
pub mod compare;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod solve;
pub mod tui;
