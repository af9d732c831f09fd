//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the numerical code stays clean and testable
//! - output changes are localized (golden tests live here)

use crate::compare::ModelComparison;
use crate::domain::{
    Axis, ModelKind, PhysicalConstants, SamplePoint, ShapeParameters, SolveResult, SweepVariable,
    Uncertainty,
};

/// Format a solve result (and its uncertainty, if computed).
pub fn format_solve_result(result: &SolveResult, constants: &PhysicalConstants) -> String {
    let mut out = String::new();
    let free = result.solve_for;
    let known = free.other();

    out.push_str("=== ediff - axis from diffusion coefficient ===\n");
    out.push_str(&format!(
        "Model: {} | T={:.2} K | eta={:.5} Pa·s\n",
        result.model.display_name(),
        constants.temperature_k(),
        constants.viscosity_pa_s()
    ));
    out.push_str(&format!(
        "Input: {}={:.4} nm | D_target={} m^2/s\n",
        known.symbol(),
        result.known_value,
        fmt_d(result.target_d)
    ));
    out.push('\n');

    out.push_str(&format!(
        "Solved {}: {:.6} nm",
        free.display_name(),
        result.optimized_value
    ));
    match result.uncertainty {
        Some(Uncertainty::Sigma(s)) => out.push_str(&format!(" ± {s:.6} nm\n")),
        Some(Uncertainty::Undefined) => out.push_str(" ± undefined (D insensitive to this axis)\n"),
        None => out.push('\n'),
    }

    let (a, b) = result.shape();
    out.push_str(&format!("Shape: a={a:.6} nm, b={b:.6} nm, p=b/a={:.6}\n", b / a));
    out.push_str(&format!(
        "Residual: {} m^2/s after {} iterations\n",
        fmt_d(result.residual_error),
        result.iterations
    ));

    out
}

/// Format a single-shape model comparison.
pub fn format_comparison(cmp: &ModelComparison) -> String {
    let mut out = String::new();
    let shape = ShapeParameters { a: cmp.a, b: cmp.b };
    out.push_str(&format!(
        "Model comparison at a={:.4} nm, b={:.4} nm (p={:.4})\n",
        shape.a,
        shape.b,
        shape.aspect_ratio()
    ));

    out.push_str(format!("{:<10} {:>14}", "model", "D (m^2/s)").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<14}", "", "").trim_end());
    out.push('\n');
    for (model, d) in &cmp.values {
        out.push_str(&format!("{:<10} {:>14}\n", model.display_name(), fmt_d(*d)));
    }

    out.push('\n');
    for diff in &cmp.differences {
        out.push_str(&format!(
            "{} vs {}: {}\n",
            diff.model.display_name(),
            diff.reference.display_name(),
            fmt_percent(diff.percent)
        ));
    }

    out
}

/// Format sweep points as a table with one column per model.
pub fn format_sample_table(points: &[SamplePoint], variable: SweepVariable, fixed_axis: Axis) -> String {
    let mut out = String::new();
    let models: Vec<ModelKind> = points
        .first()
        .map(|p| p.values.keys().copied().collect())
        .unwrap_or_default();

    let x_label = match variable {
        SweepVariable::Axis => format!("{} (nm)", fixed_axis.other().symbol()),
        SweepVariable::Ratio => "p = b/a".to_string(),
    };

    let mut header = format!("{x_label:>12}");
    let mut rule = format!("{:->12}", "");
    for m in &models {
        header.push_str(&format!(" {:>14}", m.display_name()));
        rule.push_str(&format!(" {:->14}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(rule.trim_end());
    out.push('\n');

    for p in points {
        let mut row = format!("{:>12.4}", p.x);
        for m in &models {
            let d = p.values.get(m).copied().unwrap_or(f64::NAN);
            row.push_str(&format!(" {:>14}", fmt_d(d)));
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }

    out
}

/// Format an inverse curve (target `D` → solved axis).
pub fn format_inverse_curve(curve: &[(f64, f64)], model: ModelKind, solve_for: Axis) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Inverse curve ({}): D -> {}\n",
        model.display_name(),
        solve_for.display_name()
    ));
    out.push_str(format!("{:>14} {:>14}", "D (m^2/s)", format!("{} (nm)", solve_for.symbol())).trim_end());
    out.push('\n');
    for &(d, x) in curve {
        let x = if x.is_finite() { format!("{x:.6}") } else { "-".to_string() };
        out.push_str(&format!("{:>14} {:>14}\n", fmt_d(d), x));
    }
    out
}

/// Scientific notation for diffusion coefficients; `-` for missing values.
pub fn fmt_d(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.4e}")
    } else {
        "-".to_string()
    }
}

fn fmt_percent(v: f64) -> String {
    if v.is_finite() {
        format!("{v:+.3}%")
    } else {
        "-".to_string()
    }
}
