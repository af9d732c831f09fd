//! Levenberg–Marquardt for small nonlinear least-squares problems.
//!
//! Each iteration:
//! - builds a one-sided finite-difference Jacobian `J`
//! - solves the damped system `(JᵀJ + λ·diag(JᵀJ)) δ = −Jᵀr` as an augmented
//!   least-squares problem (see `lstsq`)
//! - accepts the step if the cost decreases (λ shrinks), otherwise rejects it
//!   (λ grows)
//!
//! A trial point whose residuals are not finite is always rejected. Residual
//! functions can therefore return `f64::INFINITY` outside their feasible region
//! and the damping pulls the iterate back inside.

use nalgebra::{DMatrix, DVector};

use crate::math::diff::forward_jacobian;
use crate::math::lstsq::solve_least_squares;

const LAMBDA_UP: f64 = 10.0;
const LAMBDA_DOWN: f64 = 0.1;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e16;

/// Floor for `diag(JᵀJ)` so a flat direction still receives some damping.
const DIAG_FLOOR: f64 = 1e-30;

/// Solver options.
#[derive(Debug, Clone)]
pub struct LmOptions {
    /// Total iteration budget (accepted + rejected steps).
    pub max_iter: usize,
    /// Stop when `max |r_i| <= f_tol`.
    pub f_tol: f64,
    /// Stop when an accepted step satisfies `‖δ‖ <= x_tol·(‖x‖ + x_tol)`.
    pub x_tol: f64,
    /// Relative step for the finite-difference Jacobian.
    pub jac_rel_step: f64,
    /// Initial damping.
    pub lambda_init: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_iter: 200,
            f_tol: 1e-12,
            x_tol: 1e-14,
            jac_rel_step: 1e-7,
            lambda_init: 1e-3,
        }
    }
}

/// Why the iteration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Residuals are below `f_tol`.
    ResidualTolerance,
    /// The last accepted step was below `x_tol`.
    StepTolerance,
    /// Damping exceeded its cap, no Jacobian could be formed, or the start was infeasible.
    Stalled,
    /// The iteration budget ran out.
    MaxIterations,
}

/// Final state of a Levenberg–Marquardt run.
#[derive(Debug, Clone)]
pub struct LmReport {
    pub x: DVector<f64>,
    pub residuals: DVector<f64>,
    /// `½‖r‖²`.
    pub cost: f64,
    pub iterations: usize,
    pub termination: Termination,
}

impl LmReport {
    pub fn max_abs_residual(&self) -> f64 {
        self.residuals.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }
}

/// Minimize `½‖f(x)‖²` starting from `x0`.
pub fn levenberg_marquardt<F>(f: F, x0: DVector<f64>, opts: &LmOptions) -> LmReport
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let mut x = x0;
    let mut r = f(&x);
    let mut cost = 0.5 * r.norm_squared();
    let mut lambda = opts.lambda_init;

    let report = |x: DVector<f64>, r: DVector<f64>, cost: f64, iterations: usize, termination| LmReport {
        x,
        residuals: r,
        cost,
        iterations,
        termination,
    };

    if !cost.is_finite() {
        return report(x, r, cost, 0, Termination::Stalled);
    }

    let n = x.len();
    let m = r.len();
    let mut jacobian: Option<DMatrix<f64>> = None;

    for iter in 0..opts.max_iter {
        if max_abs(&r) <= opts.f_tol {
            return report(x, r, cost, iter, Termination::ResidualTolerance);
        }

        // The Jacobian only changes after an accepted step.
        let j = match jacobian.take() {
            Some(j) => j,
            None => match forward_jacobian(&f, &x, &r, opts.jac_rel_step) {
                Some(j) => j,
                None => return report(x, r, cost, iter, Termination::Stalled),
            },
        };

        let mut aug = DMatrix::<f64>::zeros(m + n, n);
        aug.rows_mut(0, m).copy_from(&j);
        for k in 0..n {
            let diag = j.column(k).norm_squared().max(DIAG_FLOOR);
            aug[(m + k, k)] = (lambda * diag).sqrt();
        }
        let mut rhs = DVector::<f64>::zeros(m + n);
        rhs.rows_mut(0, m).copy_from(&(-&r));

        let step = solve_least_squares(&aug, &rhs);
        let accepted = step.and_then(|step| {
            let x_new = &x + &step;
            let r_new = f(&x_new);
            let cost_new = 0.5 * r_new.norm_squared();
            (cost_new.is_finite() && cost_new < cost).then_some((step, x_new, r_new, cost_new))
        });

        match accepted {
            Some((step, x_new, r_new, cost_new)) => {
                let small = step.norm() <= opts.x_tol * (x.norm() + opts.x_tol);
                log::debug!(
                    "lm iter {iter}: accepted x={:?} cost={cost_new:.3e} lambda={lambda:.1e}",
                    x_new.as_slice()
                );
                x = x_new;
                r = r_new;
                cost = cost_new;
                lambda = (lambda * LAMBDA_DOWN).max(LAMBDA_MIN);

                if max_abs(&r) <= opts.f_tol {
                    return report(x, r, cost, iter + 1, Termination::ResidualTolerance);
                }
                if small {
                    return report(x, r, cost, iter + 1, Termination::StepTolerance);
                }
            }
            None => {
                jacobian = Some(j);
                lambda *= LAMBDA_UP;
                if lambda > LAMBDA_MAX {
                    return report(x, r, cost, iter + 1, Termination::Stalled);
                }
            }
        }
    }

    report(x, r, cost, opts.max_iter, Termination::MaxIterations)
}

fn max_abs(v: &DVector<f64>) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}
