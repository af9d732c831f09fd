//! Linearised uncertainty propagation through the implicit relation
//! `D(unknown, known) = D_target`.
//!
//! ```text
//! σ_unknown² = (σ_D² + (∂D/∂known)²·σ_known²) / (∂D/∂unknown)²
//! ```
//!
//! Both partial derivatives come from centered finite differences of the
//! forward model at the solved shape.

use crate::domain::{Axis, ModelKind, PhysicalConstants, Uncertainty, UncertaintyInputs};
use crate::error::EstimateError;
use crate::math::diff::central_difference;
use crate::models::{evaluate, in_sphere_band};

/// Finite-difference step (nm).
pub const DERIVATIVE_STEP_NM: f64 = 1e-5;

/// Below this `|∂D/∂unknown|` (m²/s per nm) the uncertainty is undefined.
pub const SENSITIVITY_FLOOR: f64 = 1e-15;

/// Partial derivatives of `D` at the solved shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensitivities {
    /// `∂D/∂(solved axis)`.
    pub d_unknown: f64,
    /// `∂D/∂(known axis)`.
    pub d_known: f64,
}

/// `∂D/∂wrt` at `(a, b)`, or `0.0` (with a warning) if the model cannot be
/// evaluated on both sides of the point.
///
/// A Perrin stencil point inside the spherical band counts as a failed
/// evaluation: that branch is not continuous with the general one.
pub fn partial_derivative(
    constants: &PhysicalConstants,
    model: ModelKind,
    wrt: Axis,
    a: f64,
    b: f64,
    step: f64,
) -> f64 {
    let (x, other) = match wrt {
        Axis::A => (a, b),
        Axis::B => (b, a),
    };
    let at = |v: f64| {
        let (pa, pb) = wrt.arrange(v, other);
        if model == ModelKind::Perrin && in_sphere_band(pa, pb) {
            return Err(EstimateError::domain(format!(
                "stencil point a={pa}, b={pb} lies in the Perrin spherical band"
            )));
        }
        evaluate(constants, model, pa, pb)
    };

    match central_difference(at, x, step) {
        Ok(d) => d,
        Err(err) => {
            log::warn!(
                "dD/d{} for {} at a={a}, b={b} is undefined within ±{step} nm ({err}); using 0",
                wrt.symbol(),
                model.display_name()
            );
            0.0
        }
    }
}

/// Both sensitivities at the solved shape.
pub fn sensitivities(
    constants: &PhysicalConstants,
    model: ModelKind,
    solve_for: Axis,
    optimized: f64,
    known: f64,
) -> Sensitivities {
    let (a, b) = solve_for.arrange(optimized, known);
    Sensitivities {
        d_unknown: partial_derivative(constants, model, solve_for, a, b, DERIVATIVE_STEP_NM),
        d_known: partial_derivative(constants, model, solve_for.other(), a, b, DERIVATIVE_STEP_NM),
    }
}

/// Combine sensitivities with input sigmas.
pub fn propagate(s: &Sensitivities, inputs: &UncertaintyInputs) -> Uncertainty {
    if s.d_unknown.abs() < SENSITIVITY_FLOOR {
        return Uncertainty::Undefined;
    }
    let numerator = inputs.sigma_d * inputs.sigma_d
        + s.d_known * s.d_known * inputs.sigma_known * inputs.sigma_known;
    let variance = numerator / (s.d_unknown * s.d_unknown);
    Uncertainty::Sigma(variance.abs().sqrt())
}

/// One-sigma uncertainty on the solved axis.
pub fn propagate_uncertainty(
    constants: &PhysicalConstants,
    model: ModelKind,
    solve_for: Axis,
    optimized: f64,
    known: f64,
    inputs: &UncertaintyInputs,
) -> Uncertainty {
    propagate(&sensitivities(constants, model, solve_for, optimized, known), inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel_diff(x: f64, y: f64) -> f64 {
        ((x - y) / y).abs()
    }

    #[test]
    fn zero_known_sigma_reduces_to_sigma_d_over_slope() {
        // Original: D ∝ b^(-2/3), so |∂D/∂b| = (2/3)·D/b.
        let c = PhysicalConstants::default();
        let d = evaluate(&c, ModelKind::Original, 5.0, 15.0).unwrap();
        let sigma_d = 0.02 * d;
        let inputs = UncertaintyInputs::new(sigma_d, 0.0).unwrap();

        let u = propagate_uncertainty(&c, ModelKind::Original, Axis::B, 15.0, 5.0, &inputs);
        let expected = sigma_d / (2.0 / 3.0 * d / 15.0);
        let sigma = u.sigma().unwrap();
        assert!(rel_diff(sigma, expected) < 1e-6, "{sigma} vs {expected}");
    }

    #[test]
    fn known_axis_sigma_adds_in_quadrature() {
        let s = Sensitivities {
            d_unknown: -2.0,
            d_known: 4.0,
        };
        let inputs = UncertaintyInputs::new(3.0, 1.0).unwrap();
        // sqrt(9 + 16) / 2
        assert_eq!(propagate(&s, &inputs), Uncertainty::Sigma(2.5));
    }

    #[test]
    fn insensitive_unknown_is_undefined() {
        let s = Sensitivities {
            d_unknown: 1e-16,
            d_known: 1.0,
        };
        let inputs = UncertaintyInputs::new(1.0, 1.0).unwrap();
        assert_eq!(propagate(&s, &inputs), Uncertainty::Undefined);
    }

    #[test]
    fn very_viscous_solvent_makes_uncertainty_undefined() {
        let c = PhysicalConstants::new(298.15, 1.0e4).unwrap();
        let inputs = UncertaintyInputs::new(1e-20, 0.1).unwrap();
        let u = propagate_uncertainty(&c, ModelKind::Original, Axis::B, 15.0, 5.0, &inputs);
        assert_eq!(u, Uncertainty::Undefined);
    }

    #[test]
    fn derivative_at_domain_edge_degrades_to_zero() {
        let c = PhysicalConstants::default();
        let d = partial_derivative(&c, ModelKind::Original, Axis::A, 5e-6, 15.0, DERIVATIVE_STEP_NM);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn perrin_stencil_touching_sphere_band_degrades_to_zero() {
        // b − h lands on a = 5 exactly.
        let c = PhysicalConstants::default();
        let b = 5.0 + DERIVATIVE_STEP_NM;
        let d = partial_derivative(&c, ModelKind::Perrin, Axis::B, 5.0, b, DERIVATIVE_STEP_NM);
        assert_eq!(d, 0.0);

        let inputs = UncertaintyInputs::new(1e-13, 0.0).unwrap();
        let u = propagate_uncertainty(&c, ModelKind::Perrin, Axis::B, b, 5.0, &inputs);
        assert_eq!(u, Uncertainty::Undefined);

        // Just outside the stencil reach the general branch is used on both sides.
        let d = partial_derivative(&c, ModelKind::Perrin, Axis::B, 5.0, 5.01, DERIVATIVE_STEP_NM);
        assert!(d < 0.0 && d.is_finite(), "{d}");
    }

    #[test]
    fn sensitivities_have_expected_signs() {
        let c = PhysicalConstants::default();
        for model in ModelKind::ALL {
            let s = sensitivities(&c, model, Axis::B, 15.0, 5.0);
            assert!(s.d_unknown < 0.0, "{model:?}: {s:?}");
            assert!(s.d_known < 0.0, "{model:?}: {s:?}");
        }
    }
}
