//! Shared calculation pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate -> solve -> (optional) propagate uncertainty, or validate -> sample -> series.
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::compare::{ModelComparison, compare_models, sample, series};
use crate::domain::{
    PhysicalConstants, SamplePoint, SampleSeries, ShapeParameters, SolveConfig, SolveResult,
    SweepConfig,
};
use crate::error::EstimateError;
use crate::solve::{SolverOptions, propagate_uncertainty, solve_with_options};

/// Solve the configured axis and, when sigmas are supplied, attach its uncertainty.
pub fn run_solve(config: &SolveConfig) -> Result<SolveResult, EstimateError> {
    let opts = SolverOptions {
        max_iter: config.max_iter,
        ..SolverOptions::default()
    };
    let mut result = solve_with_options(
        &config.constants,
        config.model,
        config.solve_for,
        config.known_value,
        config.target_d,
        config.initial_guess,
        &opts,
    )?;

    if let Some(inputs) = &config.uncertainty {
        result.uncertainty = Some(propagate_uncertainty(
            &config.constants,
            config.model,
            config.solve_for,
            result.optimized_value,
            config.known_value,
            inputs,
        ));
    }

    log::info!(
        "{} solve for {}: {:.6} nm after {} iterations",
        config.model.display_name(),
        config.solve_for.symbol(),
        result.optimized_value,
        result.iterations
    );
    Ok(result)
}

/// All computed outputs of a single sweep.
#[derive(Debug, Clone)]
pub struct SweepOutput {
    pub points: Vec<SamplePoint>,
    pub series: Vec<SampleSeries>,
}

/// Sample every configured model across the sweep.
pub fn run_sweep(config: &SweepConfig) -> Result<SweepOutput, EstimateError> {
    let points = sample(
        &config.constants,
        &config.models,
        config.fixed_axis,
        config.fixed_value,
        &config.sweep,
    )?;
    let series = series(&points);
    Ok(SweepOutput { points, series })
}

/// Validate a shape and compare the three models at it.
pub fn run_compare(constants: &PhysicalConstants, a: f64, b: f64) -> Result<ModelComparison, EstimateError> {
    let shape = ShapeParameters::new(a, b)?;
    Ok(compare_models(constants, shape.a, shape.b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Axis, ModelKind, Spacing, SweepSpec, SweepVariable, UncertaintyInputs};
    use crate::models::evaluate;

    fn solve_config(uncertainty: Option<UncertaintyInputs>) -> SolveConfig {
        let constants = PhysicalConstants::default();
        let target_d = evaluate(&constants, ModelKind::Perrin, 5.0, 15.0).unwrap();
        SolveConfig {
            constants,
            model: ModelKind::Perrin,
            solve_for: Axis::B,
            known_value: 5.0,
            target_d,
            initial_guess: None,
            max_iter: 200,
            uncertainty,
            export_json: None,
        }
    }

    #[test]
    fn run_solve_attaches_uncertainty_only_when_requested() {
        let plain = run_solve(&solve_config(None)).unwrap();
        assert!(plain.uncertainty.is_none());
        assert!((plain.optimized_value - 15.0).abs() < 1e-6);

        let sigma = UncertaintyInputs::new(plain.target_d * 0.01, 0.1).unwrap();
        let with = run_solve(&solve_config(Some(sigma))).unwrap();
        let s = with.uncertainty.and_then(|u| u.sigma()).unwrap();
        assert!(s > 0.0 && s.is_finite());
    }

    #[test]
    fn run_sweep_returns_one_series_per_model() {
        let config = SweepConfig {
            constants: PhysicalConstants::default(),
            models: ModelKind::ALL.to_vec(),
            fixed_axis: Axis::A,
            fixed_value: 5.0,
            sweep: SweepSpec {
                variable: SweepVariable::Axis,
                start: 6.0,
                end: 30.0,
                steps: 9,
                spacing: Spacing::Linear,
            },
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_csv: None,
        };
        let out = run_sweep(&config).unwrap();
        assert_eq!(out.points.len(), 9);
        assert_eq!(out.series.len(), 3);
        assert!(out.series.iter().all(|s| s.points.len() == 9));
    }

    #[test]
    fn run_compare_rejects_invalid_shape() {
        let c = PhysicalConstants::default();
        assert!(matches!(run_compare(&c, -1.0, 5.0), Err(EstimateError::Domain(_))));
        assert!(run_compare(&c, 5.0, 15.0).is_ok());
    }
}
