//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed by value through a single calculation
//! - exported to JSON/CSV
//! - rendered by either front end (CLI or TUI)
//!
//! Lengths are always nanometres; diffusion coefficients are always m²/s.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::EstimateError;

/// Boltzmann constant (J/K).
pub const BOLTZMANN: f64 = 1.380649e-23;

/// Default absolute temperature (K).
pub const DEFAULT_TEMPERATURE_K: f64 = 298.15;

/// Default solvent viscosity (Pa·s), water near room temperature.
pub const DEFAULT_VISCOSITY_PA_S: f64 = 0.00089;

/// Nanometres to metres.
pub const NM_TO_M: f64 = 1e-9;

/// Thermodynamic constants shared by every forward-model call.
///
/// Built once at start-up and passed explicitly; there is no global copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    boltzmann: f64,
    temperature_k: f64,
    viscosity_pa_s: f64,
}

impl PhysicalConstants {
    /// Constants at the given temperature (K) and viscosity (Pa·s).
    pub fn new(temperature_k: f64, viscosity_pa_s: f64) -> Result<Self, EstimateError> {
        if !(temperature_k.is_finite() && temperature_k > 0.0) {
            return Err(EstimateError::domain(format!(
                "temperature must be finite and > 0 K (got {temperature_k})"
            )));
        }
        if !(viscosity_pa_s.is_finite() && viscosity_pa_s > 0.0) {
            return Err(EstimateError::domain(format!(
                "viscosity must be finite and > 0 Pa·s (got {viscosity_pa_s})"
            )));
        }
        Ok(Self {
            boltzmann: BOLTZMANN,
            temperature_k,
            viscosity_pa_s,
        })
    }

    pub fn temperature_k(&self) -> f64 {
        self.temperature_k
    }

    pub fn viscosity_pa_s(&self) -> f64 {
        self.viscosity_pa_s
    }

    /// `k_B·T` in joules.
    pub fn thermal_energy(&self) -> f64 {
        self.boltzmann * self.temperature_k
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            boltzmann: BOLTZMANN,
            temperature_k: DEFAULT_TEMPERATURE_K,
            viscosity_pa_s: DEFAULT_VISCOSITY_PA_S,
        }
    }
}

/// Which shape-to-diffusivity theory to use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Stokes–Einstein with an equivalent hydraulic radius.
    Original,
    /// Perrin friction factors with a hydration correction.
    Perrin,
    /// Cylinder-style log-polynomial friction ratio.
    Modern,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Original, ModelKind::Perrin, ModelKind::Modern];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Original => "Original",
            ModelKind::Perrin => "Perrin",
            ModelKind::Modern => "Modern",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ModelKind::Original => ModelKind::Perrin,
            ModelKind::Perrin => ModelKind::Modern,
            ModelKind::Modern => ModelKind::Original,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ModelKind::Original => ModelKind::Modern,
            ModelKind::Perrin => ModelKind::Original,
            ModelKind::Modern => ModelKind::Perrin,
        }
    }
}

/// One of the two shape axes.
///
/// Used both for the axis being solved for and for the axis held fixed in a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Semi-minor axis `a`.
    A,
    /// Semi-major axis `b`.
    B,
}

impl Axis {
    pub fn other(self) -> Self {
        match self {
            Axis::A => Axis::B,
            Axis::B => Axis::A,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Axis::A => "a",
            Axis::B => "b",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Axis::A => "a (semi-minor)",
            Axis::B => "b (semi-major)",
        }
    }

    /// Place a free value and a known value into `(a, b)` order, where `self`
    /// is the axis the free value belongs to.
    pub fn arrange(self, free: f64, known: f64) -> (f64, f64) {
        match self {
            Axis::A => (free, known),
            Axis::B => (known, free),
        }
    }
}

/// The pair `(a, b)` in nanometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeParameters {
    pub a: f64,
    pub b: f64,
}

impl ShapeParameters {
    pub fn new(a: f64, b: f64) -> Result<Self, EstimateError> {
        if !(a.is_finite() && a > 0.0) {
            return Err(EstimateError::domain(format!("a must be finite and > 0 nm (got {a})")));
        }
        if !(b.is_finite() && b > 0.0) {
            return Err(EstimateError::domain(format!("b must be finite and > 0 nm (got {b})")));
        }
        Ok(Self { a, b })
    }

    /// Aspect ratio `p = b/a`.
    pub fn aspect_ratio(&self) -> f64 {
        self.b / self.a
    }
}

/// Measured translational diffusion coefficient (m²/s), strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffusionTarget(f64);

impl DiffusionTarget {
    pub fn new(value: f64) -> Result<Self, EstimateError> {
        if !(value.is_finite() && value > 0.0) {
            return Err(EstimateError::domain(format!(
                "target diffusion coefficient must be finite and > 0 m^2/s (got {value})"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// One-sigma input uncertainties: `σ_D` (m²/s) and `σ_known` (nm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyInputs {
    pub sigma_d: f64,
    pub sigma_known: f64,
}

impl UncertaintyInputs {
    pub fn new(sigma_d: f64, sigma_known: f64) -> Result<Self, EstimateError> {
        if !(sigma_d.is_finite() && sigma_d >= 0.0) {
            return Err(EstimateError::domain(format!(
                "sigma_D must be finite and >= 0 (got {sigma_d})"
            )));
        }
        if !(sigma_known.is_finite() && sigma_known >= 0.0) {
            return Err(EstimateError::domain(format!(
                "sigma of the known axis must be finite and >= 0 (got {sigma_known})"
            )));
        }
        Ok(Self {
            sigma_d,
            sigma_known,
        })
    }
}

/// Propagated one-sigma uncertainty on the solved axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Uncertainty {
    /// Finite, non-negative sigma (nm).
    Sigma(f64),
    /// `D` is locally insensitive to the solved axis.
    Undefined,
}

impl Uncertainty {
    pub fn sigma(self) -> Option<f64> {
        match self {
            Uncertainty::Sigma(s) => Some(s),
            Uncertainty::Undefined => None,
        }
    }
}

/// Output of one solve request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    pub model: ModelKind,
    pub solve_for: Axis,
    pub known_value: f64,
    pub target_d: f64,
    pub optimized_value: f64,
    /// `D_model(optimized) − D_target` (m²/s).
    pub residual_error: f64,
    pub iterations: usize,
    pub uncertainty: Option<Uncertainty>,
}

impl SolveResult {
    /// The solved shape in `(a, b)` order.
    pub fn shape(&self) -> (f64, f64) {
        self.solve_for.arrange(self.optimized_value, self.known_value)
    }
}

/// What the sweep's independent variable means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SweepVariable {
    /// The free axis itself (nm).
    Axis,
    /// Aspect ratio `p = b/a`.
    Ratio,
}

/// Spacing of sweep points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    Linear,
    Log,
}

/// A sweep range: `steps` points from `start` to `end` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepSpec {
    pub variable: SweepVariable,
    pub start: f64,
    pub end: f64,
    pub steps: usize,
    pub spacing: Spacing,
}

/// One sweep point: the independent value and `D` per model (NaN on failure).
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub values: BTreeMap<ModelKind, f64>,
}

/// Plot-ready `(x, y)` pairs for one model.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSeries {
    pub model: ModelKind,
    pub points: Vec<(f64, f64)>,
}

/// Configuration of a `solve` run as understood by the pipeline.
#[derive(Debug, Clone)]
pub struct SolveConfig {
    pub constants: PhysicalConstants,
    pub model: ModelKind,
    pub solve_for: Axis,
    pub known_value: f64,
    pub target_d: f64,
    pub initial_guess: Option<f64>,
    pub max_iter: usize,
    pub uncertainty: Option<UncertaintyInputs>,
    pub export_json: Option<PathBuf>,
}

/// Configuration of a `sweep` run as understood by the pipeline.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub constants: PhysicalConstants,
    pub models: Vec<ModelKind>,
    pub fixed_axis: Axis,
    pub fixed_value: f64,
    pub sweep: SweepSpec,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_csv: Option<PathBuf>,
}
