//! Residual of a forward model against a target diffusion coefficient.
//!
//! `residual(x) = D_model(x, known) − D_target` on the feasible region and
//! `INFEASIBLE` everywhere else:
//!
//! - solving for `b`: feasible iff `b > a`
//! - solving for `a`: feasible iff `0 < a < b`

use crate::domain::{Axis, ModelKind, PhysicalConstants};
use crate::models::evaluate;

/// Sentinel returned outside the feasible region.
pub const INFEASIBLE: f64 = f64::INFINITY;

/// True if `x` is an admissible value for the free axis.
pub fn is_feasible(solve_for: Axis, x: f64, known: f64) -> bool {
    if !(x.is_finite() && x > 0.0) {
        return false;
    }
    match solve_for {
        Axis::B => x > known,
        Axis::A => x < known,
    }
}

/// A forward model with one axis held fixed and a target to match.
#[derive(Debug, Clone, Copy)]
pub struct Residual<'a> {
    pub constants: &'a PhysicalConstants,
    pub model: ModelKind,
    pub solve_for: Axis,
    pub known: f64,
    pub target_d: f64,
}

impl<'a> Residual<'a> {
    pub fn new(
        constants: &'a PhysicalConstants,
        model: ModelKind,
        solve_for: Axis,
        known: f64,
        target_d: f64,
    ) -> Self {
        Self {
            constants,
            model,
            solve_for,
            known,
            target_d,
        }
    }

    pub fn is_feasible(&self, x: f64) -> bool {
        is_feasible(self.solve_for, x, self.known)
    }

    /// `D_model − D_target` at free value `x`, or `INFEASIBLE`.
    pub fn at(&self, x: f64) -> f64 {
        if !self.is_feasible(x) {
            return INFEASIBLE;
        }
        let (a, b) = self.solve_for.arrange(x, self.known);
        match evaluate(self.constants, self.model, a, b) {
            Ok(d) => d - self.target_d,
            Err(_) => INFEASIBLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_guard_per_direction() {
        assert!(is_feasible(Axis::B, 6.0, 5.0));
        assert!(!is_feasible(Axis::B, 5.0, 5.0));
        assert!(!is_feasible(Axis::B, 4.0, 5.0));
        assert!(is_feasible(Axis::A, 4.0, 5.0));
        assert!(!is_feasible(Axis::A, 5.0, 5.0));
        assert!(!is_feasible(Axis::A, 0.0, 5.0));
        assert!(!is_feasible(Axis::A, -1.0, 5.0));
        assert!(!is_feasible(Axis::B, f64::NAN, 5.0));
    }

    #[test]
    fn residual_vanishes_at_the_generating_shape() {
        let c = PhysicalConstants::default();
        for model in ModelKind::ALL {
            let d = evaluate(&c, model, 5.0, 15.0).unwrap();
            let rb = Residual::new(&c, model, Axis::B, 5.0, d);
            assert_eq!(rb.at(15.0), 0.0);
            let ra = Residual::new(&c, model, Axis::A, 15.0, d);
            assert_eq!(ra.at(5.0), 0.0);
        }
    }

    #[test]
    fn residual_returns_sentinel_outside_domain() {
        let c = PhysicalConstants::default();
        let r = Residual::new(&c, ModelKind::Modern, Axis::B, 5.0, 1e-11);
        assert_eq!(r.at(4.0), INFEASIBLE);
        assert_eq!(r.at(-3.0), INFEASIBLE);
        assert!(r.at(6.0).is_finite());
    }
}
