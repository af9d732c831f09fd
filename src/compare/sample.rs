//! Pointwise evaluation of the forward models over a sweep.
//!
//! A point that a model cannot evaluate is recorded as `NaN` for that model
//! only; the rest of the sweep is unaffected. Points are evaluated in parallel
//! and returned in sweep order.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{
    Axis, ModelKind, PhysicalConstants, SamplePoint, SampleSeries, SweepSpec, SweepVariable,
};
use crate::error::EstimateError;
use crate::math::grid::sweep_grid;
use crate::models::evaluate;
use crate::solve::solve;

/// Shape `(a, b)` at sweep value `x`.
///
/// - `SweepVariable::Axis`: `x` is the free (non-fixed) axis.
/// - `SweepVariable::Ratio`: `x` is `p = b/a`.
pub fn sweep_shape(fixed_axis: Axis, fixed_value: f64, variable: SweepVariable, x: f64) -> (f64, f64) {
    match (variable, fixed_axis) {
        (SweepVariable::Axis, _) => fixed_axis.other().arrange(x, fixed_value),
        (SweepVariable::Ratio, Axis::A) => (fixed_value, fixed_value * x),
        (SweepVariable::Ratio, Axis::B) => (fixed_value / x, fixed_value),
    }
}

/// Evaluate `models` at every point of `sweep` with one axis held fixed.
pub fn sample(
    constants: &PhysicalConstants,
    models: &[ModelKind],
    fixed_axis: Axis,
    fixed_value: f64,
    sweep: &SweepSpec,
) -> Result<Vec<SamplePoint>, EstimateError> {
    if !(fixed_value.is_finite() && fixed_value > 0.0) {
        return Err(EstimateError::domain(format!(
            "fixed axis {} must be finite and > 0 nm (got {fixed_value})",
            fixed_axis.symbol()
        )));
    }
    if models.is_empty() {
        return Err(EstimateError::InvalidSweep("no models selected".to_string()));
    }
    let grid = sweep_grid(sweep)?;

    let points = grid
        .par_iter()
        .map(|&x| {
            let (a, b) = sweep_shape(fixed_axis, fixed_value, sweep.variable, x);
            let values = models
                .iter()
                .map(|&model| {
                    let d = evaluate(constants, model, a, b).unwrap_or_else(|err| {
                        log::debug!("sample x={x}: {} failed: {err}", model.display_name());
                        f64::NAN
                    });
                    (model, d)
                })
                .collect::<BTreeMap<_, _>>();
            SamplePoint { x, values }
        })
        .collect();

    Ok(points)
}

/// Regroup sweep points into one plot series per model (NaN values kept).
pub fn series(points: &[SamplePoint]) -> Vec<SampleSeries> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    first
        .values
        .keys()
        .map(|&model| SampleSeries {
            model,
            points: points
                .iter()
                .map(|p| (p.x, p.values.get(&model).copied().unwrap_or(f64::NAN)))
                .collect(),
        })
        .collect()
}

/// Percentage difference of one model against a reference model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RelativeDifference {
    pub model: ModelKind,
    pub reference: ModelKind,
    /// `100·(D_model − D_reference)/D_reference`, NaN if either side failed.
    pub percent: f64,
}

/// All three models evaluated at one shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelComparison {
    pub a: f64,
    pub b: f64,
    pub values: BTreeMap<ModelKind, f64>,
    pub differences: Vec<RelativeDifference>,
}

/// Model pairs reported by `compare_models`, as `(model, reference)`.
pub const COMPARISON_PAIRS: [(ModelKind, ModelKind); 3] = [
    (ModelKind::Perrin, ModelKind::Original),
    (ModelKind::Modern, ModelKind::Original),
    (ModelKind::Modern, ModelKind::Perrin),
];

/// Evaluate every model at `(a, b)` and report pairwise percentage differences.
pub fn compare_models(constants: &PhysicalConstants, a: f64, b: f64) -> ModelComparison {
    let values: BTreeMap<ModelKind, f64> = ModelKind::ALL
        .iter()
        .map(|&m| (m, evaluate(constants, m, a, b).unwrap_or(f64::NAN)))
        .collect();

    let differences = COMPARISON_PAIRS
        .iter()
        .map(|&(model, reference)| {
            let d = values[&model];
            let d_ref = values[&reference];
            RelativeDifference {
                model,
                reference,
                percent: 100.0 * (d - d_ref) / d_ref,
            }
        })
        .collect();

    ModelComparison {
        a,
        b,
        values,
        differences,
    }
}

/// Solved axis as a function of the target coefficient.
///
/// Each target is solved independently; a failed solve yields `NaN` at that point.
pub fn inverse_curve(
    constants: &PhysicalConstants,
    model: ModelKind,
    solve_for: Axis,
    known: f64,
    targets: &[f64],
) -> Vec<(f64, f64)> {
    targets
        .par_iter()
        .map(|&d| {
            let x = match solve(constants, model, solve_for, known, d, None) {
                Ok(res) => res.optimized_value,
                Err(err) => {
                    log::debug!("inverse curve D={d:e}: {err}");
                    f64::NAN
                }
            };
            (d, x)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Spacing;
    use crate::models::{HYDRATION_SHELL_NM, hydraulic_radius_nm};

    fn axis_sweep(start: f64, end: f64, steps: usize) -> SweepSpec {
        SweepSpec {
            variable: SweepVariable::Axis,
            start,
            end,
            steps,
            spacing: Spacing::Linear,
        }
    }

    #[test]
    fn sweep_shape_resolves_each_variable() {
        assert_eq!(sweep_shape(Axis::A, 5.0, SweepVariable::Axis, 12.0), (5.0, 12.0));
        assert_eq!(sweep_shape(Axis::B, 15.0, SweepVariable::Axis, 4.0), (4.0, 15.0));
        assert_eq!(sweep_shape(Axis::A, 5.0, SweepVariable::Ratio, 3.0), (5.0, 15.0));
        assert_eq!(sweep_shape(Axis::B, 15.0, SweepVariable::Ratio, 3.0), (5.0, 15.0));
    }

    #[test]
    fn sample_preserves_sweep_order_and_models() {
        let c = PhysicalConstants::default();
        let pts = sample(&c, &ModelKind::ALL, Axis::A, 5.0, &axis_sweep(6.0, 30.0, 25)).unwrap();
        assert_eq!(pts.len(), 25);
        for (i, p) in pts.iter().enumerate() {
            assert!((p.x - (6.0 + i as f64)).abs() < 1e-12);
            assert_eq!(p.values.len(), 3);
            assert!(p.values.values().all(|d| d.is_finite() && *d > 0.0));
        }
    }

    #[test]
    fn failing_points_become_nan_without_aborting() {
        let c = PhysicalConstants::default();
        let sweep = SweepSpec {
            variable: SweepVariable::Ratio,
            start: (-16.0_f64).exp(),
            end: 1.0,
            steps: 9,
            spacing: Spacing::Log,
        };
        let pts = sample(&c, &ModelKind::ALL, Axis::A, 1.0, &sweep).unwrap();
        assert_eq!(pts.len(), 9);

        assert!(pts[0].values[&ModelKind::Modern].is_nan());
        assert!(pts[0].values[&ModelKind::Original].is_finite());
        assert!(pts[0].values[&ModelKind::Perrin].is_finite());
        assert!(pts[8].values[&ModelKind::Modern].is_finite());
    }

    #[test]
    fn sample_rejects_bad_inputs() {
        let c = PhysicalConstants::default();
        assert!(matches!(
            sample(&c, &ModelKind::ALL, Axis::A, 0.0, &axis_sweep(6.0, 30.0, 5)),
            Err(EstimateError::Domain(_))
        ));
        assert!(matches!(
            sample(&c, &[], Axis::A, 5.0, &axis_sweep(6.0, 30.0, 5)),
            Err(EstimateError::InvalidSweep(_))
        ));
        assert!(matches!(
            sample(&c, &ModelKind::ALL, Axis::A, 5.0, &axis_sweep(30.0, 6.0, 5)),
            Err(EstimateError::InvalidSweep(_))
        ));
    }

    #[test]
    fn series_groups_by_model() {
        let c = PhysicalConstants::default();
        let pts = sample(
            &c,
            &[ModelKind::Original, ModelKind::Modern],
            Axis::A,
            5.0,
            &axis_sweep(6.0, 10.0, 5),
        )
        .unwrap();
        let s = series(&pts);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].model, ModelKind::Original);
        assert_eq!(s[1].model, ModelKind::Modern);
        assert_eq!(s[1].points.len(), 5);
        assert_eq!(s[1].points[2].0, pts[2].x);
        assert!(series(&[]).is_empty());
    }

    #[test]
    fn reference_shape_gives_three_distinct_coefficients() {
        let c = PhysicalConstants::default();
        let cmp = compare_models(&c, 5.0, 15.0);
        let d: Vec<f64> = cmp.values.values().copied().collect();
        assert_eq!(d.len(), 3);
        assert!(d.iter().all(|v| v.is_finite() && *v > 0.0));
        assert!(d[0] != d[1] && d[1] != d[2] && d[0] != d[2]);
    }

    #[test]
    fn perrin_vs_original_difference_at_aspect_three() {
        // Effective radii: Original uses r_H, Perrin uses r_eq·f_P + δ_w.
        let c = PhysicalConstants::default();
        let (a, b) = (5.0_f64, 15.0_f64);
        let p = b / a;
        let r_h = hydraulic_radius_nm(a, b);
        let r_eq = (a * a * b / 8.0).cbrt();
        let root = (p * p - 1.0).sqrt();
        let f_p = p.powf(-1.0 / 3.0) * root / (p + root).ln();
        let expected = 100.0 * (r_h / (r_eq * f_p + HYDRATION_SHELL_NM) - 1.0);

        let cmp = compare_models(&c, a, b);
        let diff = cmp.differences[0];
        assert_eq!((diff.model, diff.reference), (ModelKind::Perrin, ModelKind::Original));
        assert!(diff.percent > 0.0, "Perrin should diffuse faster: {}", diff.percent);
        assert!((diff.percent - expected).abs() < 1e-8, "{} vs {expected}", diff.percent);
        assert!(diff.percent > 15.0 && diff.percent < 25.0);
    }

    #[test]
    fn failed_model_yields_nan_difference() {
        let c = PhysicalConstants::default();
        let cmp = compare_models(&c, 1.0, (-16.0_f64).exp());
        assert!(cmp.values[&ModelKind::Modern].is_nan());
        assert!(cmp.differences[1].percent.is_nan());
        assert!(cmp.differences[0].percent.is_finite());
    }

    #[test]
    fn inverse_curve_matches_forward_model() {
        let c = PhysicalConstants::default();
        let targets: Vec<f64> = [10.0, 15.0, 20.0]
            .iter()
            .map(|&b| evaluate(&c, ModelKind::Original, 5.0, b).unwrap())
            .collect();
        let curve = inverse_curve(&c, ModelKind::Original, Axis::B, 5.0, &targets);
        for ((d, x), b) in curve.iter().zip([10.0, 15.0, 20.0]) {
            assert!((x - b).abs() / b < 1e-6, "D={d:e}: {x} vs {b}");
        }

        let curve = inverse_curve(&c, ModelKind::Original, Axis::B, 5.0, &[-1.0]);
        assert!(curve[0].1.is_nan());
    }
}
