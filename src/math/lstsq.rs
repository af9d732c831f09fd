//! Dense linear least squares.
//!
//! Every Levenberg–Marquardt step solves a small augmented system
//!
//! ```text
//! minimize ‖J δ + r‖² + λ ‖D δ‖²   ⇔   minimize ‖[J; √λ D] δ − [−r; 0]‖²
//! ```
//!
//! which is tall (more rows than columns), so we solve it with SVD rather than
//! a square factorization.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() || x.ncols() == 0 {
        return None;
    }
    let svd = x.clone().svd(true, true);

    // Try progressively looser singular-value cutoffs if the strict solve fails.
    for &tol in &[1e-14, 1e-12, 1e-10] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn augmented_scalar_system_shrinks_the_step() {
        // [j; sqrt(lambda)*j] δ = [-r; 0] gives δ = -r j / (j² (1 + lambda)).
        let j = 2.0;
        let r = 4.0;
        let lambda: f64 = 3.0;
        let x = DMatrix::from_row_slice(2, 1, &[j, lambda.sqrt() * j]);
        let y = DVector::from_row_slice(&[-r, 0.0]);
        let delta = solve_least_squares(&x, &y).unwrap();
        assert!((delta[0] - (-0.5)).abs() < 1e-12, "got {}", delta[0]);
    }

    #[test]
    fn mismatched_shapes_return_none() {
        let x = DMatrix::<f64>::zeros(2, 1);
        let y = DVector::<f64>::zeros(3);
        assert!(solve_least_squares(&x, &y).is_none());
    }
}
