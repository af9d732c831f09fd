//! Forward models `D = f(a, b)` for Original / Perrin / Modern.
//!
//! Inputs are lengths in nanometres; every model converts to metres internally
//! and returns `D` in m²/s. The solver and the comparison driver rely on the
//! exact expressions below, so branch conditions and constants are fixed.

use std::f64::consts::PI;

use crate::domain::{ModelKind, NM_TO_M, PhysicalConstants};
use crate::error::EstimateError;

/// Half-width of the spherical-limit band `|p − 1| < SPHERE_EPS` in the Perrin model.
pub const SPHERE_EPS: f64 = 1e-8;

/// Bound-water shell thickness (nm) used by the Perrin hydration correction.
pub const HYDRATION_SHELL_NM: f64 = 0.28;

/// Coefficients of the Modern friction ratio in powers of `ln(p)`.
const MODERN_RATIO_COEFFS: [f64; 4] = [1.009, 0.01395, 0.07880, 0.00604];

/// Evaluate `model` at `(a, b)`.
///
/// Fails with a domain error for non-positive lengths and for any input the
/// chosen model cannot evaluate to a finite, positive coefficient.
pub fn evaluate(
    constants: &PhysicalConstants,
    model: ModelKind,
    a: f64,
    b: f64,
) -> Result<f64, EstimateError> {
    if !(a.is_finite() && a > 0.0) {
        return Err(EstimateError::domain(format!("a must be finite and > 0 nm (got {a})")));
    }
    if !(b.is_finite() && b > 0.0) {
        return Err(EstimateError::domain(format!("b must be finite and > 0 nm (got {b})")));
    }

    let d = match model {
        ModelKind::Original => original(constants, a, b),
        ModelKind::Perrin => perrin(constants, a, b)?,
        ModelKind::Modern => modern(constants, a, b)?,
    };

    if d.is_finite() && d > 0.0 {
        Ok(d)
    } else {
        Err(EstimateError::domain(format!(
            "{} model is undefined at a={a} nm, b={b} nm",
            model.display_name()
        )))
    }
}

/// Stokes–Einstein `D = k_B·T / (6π·η·r)` for a radius in metres.
pub fn stokes_einstein(constants: &PhysicalConstants, radius_m: f64) -> f64 {
    constants.thermal_energy() / (6.0 * PI * constants.viscosity_pa_s() * radius_m)
}

/// Equivalent hydraulic radius `r_H = (a/2 · b²/4)^(1/3)` in nanometres.
pub fn hydraulic_radius_nm(a: f64, b: f64) -> f64 {
    (a / 2.0 * (b * b) / 4.0).cbrt()
}

/// Original model: Stokes–Einstein at the equivalent hydraulic radius.
pub fn original(constants: &PhysicalConstants, a: f64, b: f64) -> f64 {
    stokes_einstein(constants, hydraulic_radius_nm(a, b) * NM_TO_M)
}

/// True if `(a, b)` falls in the Perrin spherical band `|b/a − 1| < SPHERE_EPS`.
pub fn in_sphere_band(a: f64, b: f64) -> bool {
    (b / a - 1.0).abs() < SPHERE_EPS
}

/// Perrin model for prolate (`p > 1`) and oblate (`p < 1`) ellipsoids.
///
/// `D = k_B·T·f_gw / (6π·η·r_eq·f_P)`, with `f_gw` taken at the Stokes radius
/// `r_eq·f_P`. This equals Stokes–Einstein at `r_eq·f_P + δ_w`, which keeps `D`
/// strictly monotone in each axis on the prolate side.
///
/// Inside the spherical band the result is plain Stokes–Einstein at radius `a`.
/// The general branch instead tends to Stokes–Einstein at `a/2 + δ_w`, so the two
/// differ by a factor `2·f_gw(a/2)` at the band edge.
pub fn perrin(constants: &PhysicalConstants, a: f64, b: f64) -> Result<f64, EstimateError> {
    let p = b / a;

    // Removable singularity at the sphere.
    if in_sphere_band(a, b) {
        return Ok(stokes_einstein(constants, a * NM_TO_M));
    }

    let r_eq_nm = (a * a * b / 8.0).cbrt();
    let shape_factor = perrin_shape_factor(p)?;
    let f_p = 2.0 * p.powf(2.0 / 3.0) / shape_factor;
    let f_gw = hydration_correction(r_eq_nm * f_p);

    Ok(constants.thermal_energy() * f_gw
        / (6.0 * PI * constants.viscosity_pa_s() * (r_eq_nm * NM_TO_M) * f_p))
}

/// Perrin shape factor `S`.
///
/// Prolate: `S = 2·atanh(e)/e` with `e = sqrt(1 − 1/p²)`.
/// Oblate: `S = 2·atan(e)/e` with `e = sqrt(1/p² − 1)`.
/// Both tend to 2 at the sphere.
pub fn perrin_shape_factor(p: f64) -> Result<f64, EstimateError> {
    let q = 1.0 / p;
    let (e, s) = if p > 1.0 {
        let e = (1.0 - q * q).sqrt();
        (e, 2.0 * e.atanh() / e)
    } else {
        let e = (q * q - 1.0).sqrt();
        (e, 2.0 * e.atan() / e)
    };

    if !(e > 0.0 && s.is_finite() && s > 0.0) {
        return Err(EstimateError::domain(format!(
            "Perrin shape factor is undefined at aspect ratio p={p} (eccentricity {e})"
        )));
    }
    Ok(s)
}

/// Hydration correction `f_gw = r / (r + δ_w)` for a Stokes radius `r` (nm).
///
/// Always in `(0, 1)`; approaches 1 for large particles.
pub fn hydration_correction(stokes_radius_nm: f64) -> f64 {
    stokes_radius_nm / (stokes_radius_nm + HYDRATION_SHELL_NM)
}

/// Modern model: equivalent-sphere friction scaled by a log-polynomial ratio.
///
/// `L = b`, `d = a`, `p = L/d`. No ordering between `a` and `b` is enforced.
pub fn modern(constants: &PhysicalConstants, a: f64, b: f64) -> Result<f64, EstimateError> {
    let length = b;
    let diameter = a;
    let p = length / diameter;
    if !(p > 0.0) {
        return Err(EstimateError::domain(format!(
            "Modern model requires p = L/d > 0 (got {p})"
        )));
    }

    let r0_nm = (3.0 * diameter * diameter * length / 16.0).cbrt();
    let f0 = 6.0 * PI * constants.viscosity_pa_s() * r0_nm * NM_TO_M;
    let ratio = modern_friction_ratio(p);
    if !(ratio.is_finite() && ratio > 0.0) {
        return Err(EstimateError::domain(format!(
            "Modern friction ratio f/f0={ratio} is not positive at p={p}"
        )));
    }

    Ok(constants.thermal_energy() / (f0 * ratio))
}

/// `f/f₀ = 1.009 + 0.01395·ln(p) + 0.07880·ln(p)² + 0.00604·ln(p)³`.
pub fn modern_friction_ratio(p: f64) -> f64 {
    let x = p.ln();
    let [c0, c1, c2, c3] = MODERN_RATIO_COEFFS;
    c0 + c1 * x + c2 * x * x + c3 * x * x * x
}
