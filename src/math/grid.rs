//! Sweep grid generation.
//!
//! Sweeps are deterministic: the same range always yields the same points,
//! endpoints included.

use crate::domain::{Spacing, SweepSpec};
use crate::error::EstimateError;

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, EstimateError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(EstimateError::InvalidSweep(format!(
            "range must be finite with end > start (got {min}..{max})"
        )));
    }
    if steps < 2 {
        return Err(EstimateError::InvalidSweep("steps must be >= 2".to_string()));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out: Vec<f64> = (0..steps).map(|i| min + step * i as f64).collect();
    out[steps - 1] = max;
    Ok(out)
}

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, EstimateError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(EstimateError::InvalidSweep(format!(
            "log range must be finite, > 0, with end > start (got {min}..{max})"
        )));
    }
    if steps < 2 {
        return Err(EstimateError::InvalidSweep("steps must be >= 2".to_string()));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out: Vec<f64> = (0..steps).map(|i| (ln_min + step * i as f64).exp()).collect();
    out[0] = min;
    out[steps - 1] = max;
    Ok(out)
}

/// Grid points for a sweep range.
pub fn sweep_grid(spec: &SweepSpec) -> Result<Vec<f64>, EstimateError> {
    match spec.spacing {
        Spacing::Linear => lin_space(spec.start, spec.end, spec.steps),
        Spacing::Log => log_space(spec.start, spec.end, spec.steps),
    }
}
