//! Single-axis inverse solver.
//!
//! Given a model, a known axis and a target `D`, find the free axis such that
//! the forward model reproduces the target. The root is found with
//! Levenberg–Marquardt on the residual normalised by `D_target`; the
//! normalisation only conditions the iteration, the reported error is the raw
//! residual in m²/s.

use nalgebra::DVector;

use crate::domain::{Axis, DiffusionTarget, ModelKind, PhysicalConstants, SolveResult};
use crate::error::EstimateError;
use crate::math::lm::{LmOptions, Termination, levenberg_marquardt};
use crate::solve::residual::Residual;

/// Offset (nm) added to the known axis for the default `b` guess.
pub const B_GUESS_OFFSET_NM: f64 = 1.0;

/// Factor applied to the known axis for the default `a` guess.
pub const A_GUESS_FACTOR: f64 = 0.5;

/// Solver tolerances and budget.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    pub max_iter: usize,
    /// Relative residual `|r| / D_target` that counts as converged.
    pub f_tol: f64,
    /// Relative step size that ends the iteration.
    pub x_tol: f64,
    /// Largest relative residual accepted when the iteration ends on a small step.
    pub accept_tol: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iter: 200,
            f_tol: 1e-12,
            x_tol: 1e-14,
            accept_tol: 1e-8,
        }
    }
}

/// Default starting point for the free axis.
pub fn default_initial_guess(solve_for: Axis, known: f64) -> f64 {
    match solve_for {
        Axis::B => known + B_GUESS_OFFSET_NM,
        Axis::A => known * A_GUESS_FACTOR,
    }
}

/// Solve with default options.
pub fn solve(
    constants: &PhysicalConstants,
    model: ModelKind,
    solve_for: Axis,
    known: f64,
    target_d: f64,
    initial_guess: Option<f64>,
) -> Result<SolveResult, EstimateError> {
    solve_with_options(
        constants,
        model,
        solve_for,
        known,
        target_d,
        initial_guess,
        &SolverOptions::default(),
    )
}

/// Solve for `solve_for` given the other axis and `target_d`.
///
/// # Errors
/// - `Domain` if `known <= 0`, `target_d <= 0`, or the initial guess is infeasible
/// - `NonConvergence` if the tolerance is not met within the budget, or the
///   iteration stalls away from a root (e.g. the target is unreachable under the
///   ordering constraint)
pub fn solve_with_options(
    constants: &PhysicalConstants,
    model: ModelKind,
    solve_for: Axis,
    known: f64,
    target_d: f64,
    initial_guess: Option<f64>,
    opts: &SolverOptions,
) -> Result<SolveResult, EstimateError> {
    if !(known.is_finite() && known > 0.0) {
        return Err(EstimateError::domain(format!(
            "known axis {} must be finite and > 0 nm (got {known})",
            solve_for.other().symbol()
        )));
    }
    let target = DiffusionTarget::new(target_d)?.value();

    let residual = Residual::new(constants, model, solve_for, known, target);
    let x0 = initial_guess.unwrap_or_else(|| default_initial_guess(solve_for, known));
    if !residual.is_feasible(x0) {
        return Err(EstimateError::domain(format!(
            "initial guess {}={x0} nm is outside the feasible region for {}={known} nm",
            solve_for.symbol(),
            solve_for.other().symbol()
        )));
    }

    let lm_opts = LmOptions {
        max_iter: opts.max_iter,
        f_tol: opts.f_tol,
        x_tol: opts.x_tol,
        ..LmOptions::default()
    };
    let rep = levenberg_marquardt(
        |x: &DVector<f64>| DVector::from_element(1, residual.at(x[0]) / target),
        DVector::from_element(1, x0),
        &lm_opts,
    );

    let value = rep.x[0];
    let residual_error = residual.at(value);
    let rel = (residual_error / target).abs();
    let converged = rel <= opts.f_tol
        || (rep.termination != Termination::MaxIterations && rel <= opts.accept_tol);

    log::debug!(
        "solve {} for {}: x={value} rel_residual={rel:.3e} lm_residual={:.3e} iterations={} termination={:?}",
        model.display_name(),
        solve_for.symbol(),
        rep.max_abs_residual(),
        rep.iterations,
        rep.termination
    );

    if !(converged && value.is_finite() && residual_error.is_finite()) {
        return Err(EstimateError::NonConvergence {
            iterations: rep.iterations,
            last_value: value,
            residual: residual_error,
        });
    }

    Ok(SolveResult {
        model,
        solve_for,
        known_value: known,
        target_d: target,
        optimized_value: value,
        residual_error,
        iterations: rep.iterations,
        uncertainty: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluate;

    fn rel_diff(x: f64, y: f64) -> f64 {
        ((x - y) / y).abs()
    }

    #[test]
    fn recovers_b_for_reference_shape() {
        let c = PhysicalConstants::default();
        let d = evaluate(&c, ModelKind::Original, 5.0, 15.0).unwrap();
        let res = solve(&c, ModelKind::Original, Axis::B, 5.0, d, None).unwrap();
        assert!(rel_diff(res.optimized_value, 15.0) < 1e-6, "got {}", res.optimized_value);
        assert!(res.residual_error.abs() <= 1e-12 * d);
        assert_eq!(res.shape(), (5.0, res.optimized_value));
    }

    #[test]
    fn round_trip_all_models_both_directions() {
        let c = PhysicalConstants::default();
        for model in ModelKind::ALL {
            for &(a, b) in &[(5.0, 15.0), (2.0, 3.0), (1.0, 25.0), (10.0, 10.5)] {
                let d = evaluate(&c, model, a, b).unwrap();

                let rb = solve(&c, model, Axis::B, a, d, None).unwrap();
                assert!(rel_diff(rb.optimized_value, b) < 1e-6, "{model:?} b: {} vs {b}", rb.optimized_value);

                let ra = solve(&c, model, Axis::A, b, d, None).unwrap();
                assert!(rel_diff(ra.optimized_value, a) < 1e-6, "{model:?} a: {} vs {a}", ra.optimized_value);
            }
        }
    }

    #[test]
    fn explicit_initial_guess_is_used() {
        let c = PhysicalConstants::default();
        let d = evaluate(&c, ModelKind::Perrin, 5.0, 15.0).unwrap();
        let res = solve(&c, ModelKind::Perrin, Axis::B, 5.0, d, Some(40.0)).unwrap();
        assert!(rel_diff(res.optimized_value, 15.0) < 1e-6);
    }

    #[test]
    fn non_positive_inputs_are_domain_errors() {
        let c = PhysicalConstants::default();
        for model in ModelKind::ALL {
            assert!(matches!(
                solve(&c, model, Axis::B, 0.0, 4e-11, None),
                Err(EstimateError::Domain(_))
            ));
            assert!(matches!(
                solve(&c, model, Axis::A, -2.0, 4e-11, None),
                Err(EstimateError::Domain(_))
            ));
            assert!(matches!(
                solve(&c, model, Axis::B, 5.0, 0.0, None),
                Err(EstimateError::Domain(_))
            ));
            assert!(matches!(
                solve(&c, model, Axis::B, 5.0, -1e-11, None),
                Err(EstimateError::Domain(_))
            ));
        }
    }

    #[test]
    fn infeasible_initial_guess_is_a_domain_error() {
        let c = PhysicalConstants::default();
        let err = solve(&c, ModelKind::Original, Axis::B, 5.0, 4e-11, Some(3.0)).unwrap_err();
        assert!(matches!(err, EstimateError::Domain(_)));
        let err = solve(&c, ModelKind::Original, Axis::A, 5.0, 4e-11, Some(6.0)).unwrap_err();
        assert!(matches!(err, EstimateError::Domain(_)));
    }

    #[test]
    fn unreachable_target_reports_non_convergence() {
        // D at b -> a+ is the largest value reachable while b > a; ask for more.
        let c = PhysicalConstants::default();
        let d_max = evaluate(&c, ModelKind::Original, 5.0, 5.0).unwrap();
        let err = solve(&c, ModelKind::Original, Axis::B, 5.0, 2.0 * d_max, None).unwrap_err();
        match err {
            EstimateError::NonConvergence { iterations, .. } => {
                assert!(iterations <= SolverOptions::default().max_iter);
            }
            other => panic!("expected NonConvergence, got {other:?}"),
        }
    }

    #[test]
    fn tiny_budget_reports_non_convergence() {
        let c = PhysicalConstants::default();
        let d = evaluate(&c, ModelKind::Original, 1.0, 400.0).unwrap();
        let opts = SolverOptions {
            max_iter: 1,
            ..SolverOptions::default()
        };
        let err = solve_with_options(&c, ModelKind::Original, Axis::B, 1.0, d, None, &opts).unwrap_err();
        assert!(matches!(err, EstimateError::NonConvergence { iterations: 1, .. }));
    }
}
