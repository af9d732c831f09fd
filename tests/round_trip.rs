//! Forward model -> solver -> forward model, over randomly drawn prolate shapes.

use ellipsoid_diffusion::domain::{Axis, ModelKind, PhysicalConstants};
use ellipsoid_diffusion::models::evaluate;
use ellipsoid_diffusion::solve::solve;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CASES: usize = 40;
const REL_TOL: f64 = 1e-6;

fn random_shapes(seed: u64) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..CASES)
        .map(|_| {
            let a: f64 = rng.gen_range(0.05..50.0);
            let p: f64 = rng.gen_range(1.05..20.0);
            (a, a * p)
        })
        .collect()
}

#[test]
fn solving_for_b_recovers_the_major_axis() {
    let c = PhysicalConstants::default();
    for (a, b) in random_shapes(7) {
        for model in ModelKind::ALL {
            let d = evaluate(&c, model, a, b).unwrap();
            let res = solve(&c, model, Axis::B, a, d, None)
                .unwrap_or_else(|e| panic!("{model:?} a={a} b={b}: {e}"));
            let rel = ((res.optimized_value - b) / b).abs();
            assert!(rel < REL_TOL, "{model:?} a={a} b={b}: got {} (rel {rel:.2e})", res.optimized_value);
        }
    }
}

#[test]
fn solving_for_a_recovers_the_minor_axis() {
    let c = PhysicalConstants::default();
    for (a, b) in random_shapes(11) {
        for model in ModelKind::ALL {
            let d = evaluate(&c, model, a, b).unwrap();
            let res = solve(&c, model, Axis::A, b, d, None)
                .unwrap_or_else(|e| panic!("{model:?} a={a} b={b}: {e}"));
            let rel = ((res.optimized_value - a) / a).abs();
            assert!(rel < REL_TOL, "{model:?} a={a} b={b}: got {} (rel {rel:.2e})", res.optimized_value);
        }
    }
}

#[test]
fn solved_shape_reproduces_the_target() {
    let c = PhysicalConstants::new(310.0, 0.0007).unwrap();
    for (a, b) in random_shapes(3).into_iter().take(10) {
        for model in ModelKind::ALL {
            let d = evaluate(&c, model, a, b).unwrap();
            let res = solve(&c, model, Axis::B, a, d, None).unwrap();
            let (a2, b2) = res.shape();
            let d2 = evaluate(&c, model, a2, b2).unwrap();
            assert!(((d2 - d) / d).abs() < 2e-8, "{model:?}: {d2:e} vs {d:e}");
        }
    }
}

#[test]
fn thin_rods_recover_the_minor_axis() {
    let c = PhysicalConstants::default();
    let b = 15.0;
    for a in [0.05, 0.1, 0.2, 0.5, 1.0] {
        for model in ModelKind::ALL {
            let d = evaluate(&c, model, a, b).unwrap();
            let res = solve(&c, model, Axis::A, b, d, None)
                .unwrap_or_else(|e| panic!("{model:?} a={a}: {e}"));
            let rel = ((res.optimized_value - a) / a).abs();
            assert!(rel < REL_TOL, "{model:?} a={a}: got {} (rel {rel:.2e})", res.optimized_value);
        }
    }
}
