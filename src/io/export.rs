//! Export sweep tables to CSV and solve results to JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{ModelKind, PhysicalConstants, SamplePoint, SolveResult};
use crate::error::AppError;

/// CSV header; one column per model in `ModelKind::ALL` order.
pub const SAMPLES_CSV_HEADER: &str = "x,original,perrin,modern";

/// Write sweep points to a CSV file.
pub fn write_samples_csv(path: &Path, points: &[SamplePoint]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_samples(file, points)
}

/// Write sweep points as CSV to any writer.
///
/// Models that were not sampled, or failed at a point, leave an empty cell.
pub fn write_samples<W: Write>(mut out: W, points: &[SamplePoint]) -> Result<(), AppError> {
    writeln!(out, "{SAMPLES_CSV_HEADER}")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for p in points {
        let cells: Vec<String> = ModelKind::ALL
            .iter()
            .map(|m| match p.values.get(m) {
                Some(v) if v.is_finite() => format!("{v:.10e}"),
                _ => String::new(),
            })
            .collect();
        writeln!(out, "{:.10},{}", p.x, cells.join(","))
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// JSON schema of an exported solve.
#[derive(Debug, Serialize)]
pub struct SolveExport<'a> {
    pub tool: &'static str,
    pub generated_at: DateTime<Utc>,
    pub temperature_k: f64,
    pub viscosity_pa_s: f64,
    pub a_nm: f64,
    pub b_nm: f64,
    pub result: &'a SolveResult,
}

impl<'a> SolveExport<'a> {
    pub fn new(result: &'a SolveResult, constants: &PhysicalConstants, generated_at: DateTime<Utc>) -> Self {
        let (a_nm, b_nm) = result.shape();
        Self {
            tool: "ediff",
            generated_at,
            temperature_k: constants.temperature_k(),
            viscosity_pa_s: constants.viscosity_pa_s(),
            a_nm,
            b_nm,
            result,
        }
    }
}

/// Write a solve result (with constants and a UTC timestamp) to a JSON file.
pub fn write_solve_json(path: &Path, result: &SolveResult, constants: &PhysicalConstants) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create result JSON '{}': {e}", path.display())))?;

    let export = SolveExport::new(result, constants, Utc::now());
    serde_json::to_writer_pretty(file, &export)
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;

    Ok(())
}
