//! Finite-difference derivatives.
//!
//! - `central_difference`: `f'(x) ≈ (f(x+h) − f(x−h)) / 2h`, used for the
//!   sensitivities that feed uncertainty propagation.
//! - `forward_jacobian`: one-sided Jacobian for the Levenberg–Marquardt driver,
//!   falling back to a backward difference when the forward point is infeasible.

use nalgebra::{DMatrix, DVector};

/// Centered difference of a fallible scalar function.
///
/// Any error at `x ± h` is returned unchanged; callers decide how to degrade.
pub fn central_difference<F, E>(f: F, x: f64, h: f64) -> Result<f64, E>
where
    F: Fn(f64) -> Result<f64, E>,
{
    let up = f(x + h)?;
    let down = f(x - h)?;
    Ok((up - down) / (2.0 * h))
}

/// Step used for component `x_j` of a Jacobian: `rel_step · max(|x_j|, 1)`.
fn jacobian_step(x_j: f64, rel_step: f64) -> f64 {
    rel_step * x_j.abs().max(1.0)
}

/// One-sided finite-difference Jacobian of `f` at `x`, given `fx = f(x)`.
///
/// Returns `None` if neither the forward nor the backward perturbation of some
/// component yields finite residuals.
pub fn forward_jacobian<F>(f: &F, x: &DVector<f64>, fx: &DVector<f64>, rel_step: f64) -> Option<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let n = x.len();
    let m = fx.len();
    let mut jacobian = DMatrix::<f64>::zeros(m, n);
    let mut x_pert = x.clone();

    for j in 0..n {
        let x_orig = x_pert[j];
        let h = jacobian_step(x_orig, rel_step);

        x_pert[j] = x_orig + h;
        let mut f_pert = f(&x_pert);
        let mut signed_h = h;
        if !f_pert.iter().all(|v| v.is_finite()) {
            x_pert[j] = x_orig - h;
            f_pert = f(&x_pert);
            signed_h = -h;
        }
        x_pert[j] = x_orig;

        if !f_pert.iter().all(|v| v.is_finite()) {
            return None;
        }
        for i in 0..m {
            jacobian[(i, j)] = (f_pert[i] - fx[i]) / signed_h;
        }
    }

    Some(jacobian)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn central_difference_is_exact_for_quadratics() {
        let d = central_difference(|x: f64| Ok::<_, ()>(3.0 * x * x + 2.0 * x), 2.0, 1e-3).unwrap();
        assert!((d - 14.0).abs() < 1e-9, "got {d}");
    }

    #[test]
    fn central_difference_propagates_errors() {
        let f = |x: f64| if x < 1.0 { Err("below") } else { Ok(x) };
        assert_eq!(central_difference(f, 1.0, 1e-3), Err("below"));
    }

    #[test]
    fn forward_jacobian_falls_back_to_backward_step() {
        // Infeasible above x = 1.
        let f = |x: &DVector<f64>| {
            if x[0] > 1.0 {
                DVector::from_element(1, f64::INFINITY)
            } else {
                DVector::from_element(1, x[0] * x[0])
            }
        };
        let x = DVector::from_element(1, 1.0);
        let fx = f(&x);
        let j = forward_jacobian(&f, &x, &fx, 1e-7).unwrap();
        assert!((j[(0, 0)] - 2.0).abs() < 1e-5, "got {}", j[(0, 0)]);
    }

    #[test]
    fn forward_jacobian_gives_up_when_both_sides_fail() {
        let f = |x: &DVector<f64>| {
            if x[0] == 1.0 {
                DVector::from_element(1, 0.0)
            } else {
                DVector::from_element(1, f64::NAN)
            }
        };
        let x = DVector::from_element(1, 1.0);
        let fx = f(&x);
        assert!(forward_jacobian(&f, &x, &fx, 1e-7).is_none());
    }
}
