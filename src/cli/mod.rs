//! Command-line parsing for the ellipsoid diffusion estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the physics/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    Axis, DEFAULT_TEMPERATURE_K, DEFAULT_VISCOSITY_PA_S, ModelKind, Spacing, SweepVariable,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "ediff",
    version,
    about = "Ellipsoid axis estimation from translational diffusion coefficients"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Solve one semi-axis from a measured diffusion coefficient.
    Solve(SolveArgs),
    /// Evaluate all three models at one shape and print their relative differences.
    Compare(CompareArgs),
    /// Sweep one axis (or the aspect ratio) and tabulate/plot D for each model.
    Sweep(SweepArgs),
    /// Trace the solved axis across a range of target diffusion coefficients.
    Invert(InvertArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same solve/compare pipeline as the other subcommands, but
    /// renders results in a terminal UI using Ratatui.
    Tui(TuiArgs),
}

/// Thermodynamic conditions shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct ConstantsArgs {
    /// Absolute temperature (K).
    #[arg(long, env = "EDIFF_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE_K)]
    pub temperature: f64,

    /// Solvent viscosity (Pa·s).
    #[arg(long, env = "EDIFF_VISCOSITY", default_value_t = DEFAULT_VISCOSITY_PA_S)]
    pub viscosity: f64,
}

/// Options for `ediff solve`.
#[derive(Debug, Args, Clone)]
pub struct SolveArgs {
    #[command(flatten)]
    pub constants: ConstantsArgs,

    /// Hydrodynamic model.
    #[arg(short = 'm', long, value_enum, default_value_t = ModelKind::Perrin)]
    pub model: ModelKind,

    /// Axis to solve for (the other one is `--known`).
    #[arg(short = 's', long = "solve-for", value_enum, default_value_t = Axis::B)]
    pub solve_for: Axis,

    /// Value of the known axis (nm).
    #[arg(short = 'k', long)]
    pub known: f64,

    /// Target diffusion coefficient (m²/s).
    #[arg(short = 'd', long = "diffusion")]
    pub target_d: f64,

    /// Initial guess for the solved axis (nm). Defaults to known+1 for b, known/2 for a.
    #[arg(long)]
    pub guess: Option<f64>,

    /// Iteration budget for the solver.
    #[arg(long, default_value_t = 200)]
    pub max_iter: usize,

    /// One-sigma uncertainty on D (m²/s). Enables uncertainty propagation.
    #[arg(long = "sigma-d")]
    pub sigma_d: Option<f64>,

    /// One-sigma uncertainty on the known axis (nm).
    #[arg(long = "sigma-known", default_value_t = 0.0)]
    pub sigma_known: f64,

    /// Export the result (inputs, constants, outputs) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for `ediff compare`.
#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub constants: ConstantsArgs,

    /// Semi-minor axis a (nm).
    #[arg(short = 'a', long)]
    pub a: f64,

    /// Semi-major axis b (nm).
    #[arg(short = 'b', long)]
    pub b: f64,
}

/// Options for `ediff sweep`.
#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub constants: ConstantsArgs,

    /// Models to evaluate (repeat or comma-separate). Defaults to all three.
    #[arg(short = 'm', long = "model", value_enum, value_delimiter = ',')]
    pub models: Vec<ModelKind>,

    /// Axis held fixed during the sweep.
    #[arg(long = "fixed-axis", value_enum, default_value_t = Axis::A)]
    pub fixed_axis: Axis,

    /// Value of the fixed axis (nm).
    #[arg(long = "fixed-value", default_value_t = 5.0)]
    pub fixed_value: f64,

    /// Independent variable: the free axis (nm) or the aspect ratio b/a.
    #[arg(long, value_enum, default_value_t = SweepVariable::Axis)]
    pub variable: SweepVariable,

    /// Sweep start.
    #[arg(long, default_value_t = 5.0)]
    pub start: f64,

    /// Sweep end.
    #[arg(long, default_value_t = 50.0)]
    pub end: f64,

    /// Number of sweep points (endpoints included).
    #[arg(long, default_value_t = 25)]
    pub steps: usize,

    /// Point spacing.
    #[arg(long, value_enum, default_value_t = Spacing::Linear)]
    pub spacing: Spacing,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the sampled table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for `ediff invert`.
#[derive(Debug, Args, Clone)]
pub struct InvertArgs {
    #[command(flatten)]
    pub constants: ConstantsArgs,

    /// Hydrodynamic model.
    #[arg(short = 'm', long, value_enum, default_value_t = ModelKind::Perrin)]
    pub model: ModelKind,

    /// Axis to solve for.
    #[arg(short = 's', long = "solve-for", value_enum, default_value_t = Axis::B)]
    pub solve_for: Axis,

    /// Value of the known axis (nm).
    #[arg(short = 'k', long)]
    pub known: f64,

    /// Smallest target D (m²/s).
    #[arg(long = "d-min")]
    pub d_min: f64,

    /// Largest target D (m²/s).
    #[arg(long = "d-max")]
    pub d_max: f64,

    /// Number of targets (endpoints included).
    #[arg(long, default_value_t = 20)]
    pub steps: usize,

    /// Target spacing.
    #[arg(long, value_enum, default_value_t = Spacing::Log)]
    pub spacing: Spacing,
}

/// Options for `ediff tui`.
#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub constants: ConstantsArgs,

    /// Initial semi-minor axis a (nm).
    #[arg(short = 'a', long, default_value_t = 5.0)]
    pub a: f64,

    /// Initial semi-major axis b (nm).
    #[arg(short = 'b', long, default_value_t = 15.0)]
    pub b: f64,

    /// Initial model.
    #[arg(short = 'm', long, value_enum, default_value_t = ModelKind::Perrin)]
    pub model: ModelKind,
}
