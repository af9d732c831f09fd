//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - builds physical constants and run configs
//! - runs solves, comparisons, and sweeps
//! - prints reports/plots and writes optional exports

use clap::Parser;

use crate::cli::{Command, CompareArgs, ConstantsArgs, InvertArgs, SolveArgs, SweepArgs};
use crate::domain::{
    ModelKind, PhysicalConstants, SolveConfig, SweepConfig, SweepSpec, SweepVariable, UncertaintyInputs,
};
use crate::error::{AppError, EstimateError};

pub mod pipeline;

/// Entry point for the `ediff` binary.
pub fn run() -> Result<(), AppError> {
    // Values from `.env` feed the clap `env` fallbacks below.
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // We want `ediff` and `ediff --temperature 310` to behave like `ediff tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Solve(args) => handle_solve(args),
        Command::Compare(args) => handle_compare(args),
        Command::Sweep(args) => handle_sweep(args),
        Command::Invert(args) => handle_invert(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn handle_solve(args: SolveArgs) -> Result<(), AppError> {
    let config = solve_config_from_args(&args)?;
    let result = pipeline::run_solve(&config)?;

    println!("{}", crate::report::format_solve_result(&result, &config.constants));

    if let Some(path) = &config.export_json {
        crate::io::export::write_solve_json(path, &result, &config.constants)?;
    }
    Ok(())
}

fn handle_compare(args: CompareArgs) -> Result<(), AppError> {
    let constants = constants_from_args(&args.constants)?;
    let cmp = pipeline::run_compare(&constants, args.a, args.b)?;
    println!("{}", crate::report::format_comparison(&cmp));
    Ok(())
}

fn handle_sweep(args: SweepArgs) -> Result<(), AppError> {
    let config = sweep_config_from_args(&args)?;
    let out = pipeline::run_sweep(&config)?;

    println!(
        "{}",
        crate::report::format_sample_table(&out.points, config.sweep.variable, config.fixed_axis)
    );

    if config.plot {
        let x_label = match config.sweep.variable {
            SweepVariable::Axis => format!("{} (nm)", config.fixed_axis.other().symbol()),
            SweepVariable::Ratio => "b/a".to_string(),
        };
        let plot = crate::plot::render_ascii_series(&out.series, config.plot_width, config.plot_height, &x_label);
        println!("{plot}");
    }

    if let Some(path) = &config.export_csv {
        crate::io::export::write_samples_csv(path, &out.points)?;
    }
    Ok(())
}

fn handle_invert(args: InvertArgs) -> Result<(), AppError> {
    let constants = constants_from_args(&args.constants)?;
    if !(args.known.is_finite() && args.known > 0.0) {
        return Err(EstimateError::domain(format!(
            "known axis {} must be finite and > 0 nm (got {})",
            args.solve_for.other().symbol(),
            args.known
        ))
        .into());
    }
    let targets = crate::math::sweep_grid(&SweepSpec {
        variable: SweepVariable::Axis,
        start: args.d_min,
        end: args.d_max,
        steps: args.steps,
        spacing: args.spacing,
    })?;

    let curve = crate::compare::inverse_curve(&constants, args.model, args.solve_for, args.known, &targets);
    println!(
        "{}",
        crate::report::format_inverse_curve(&curve, args.model, args.solve_for)
    );
    Ok(())
}

/// Validate `--temperature` / `--viscosity`.
pub fn constants_from_args(args: &ConstantsArgs) -> Result<PhysicalConstants, AppError> {
    Ok(PhysicalConstants::new(args.temperature, args.viscosity)?)
}

pub fn solve_config_from_args(args: &SolveArgs) -> Result<SolveConfig, AppError> {
    let constants = constants_from_args(&args.constants)?;
    let uncertainty = args
        .sigma_d
        .map(|sigma_d| UncertaintyInputs::new(sigma_d, args.sigma_known))
        .transpose()?;

    Ok(SolveConfig {
        constants,
        model: args.model,
        solve_for: args.solve_for,
        known_value: args.known,
        target_d: args.target_d,
        initial_guess: args.guess,
        max_iter: args.max_iter,
        uncertainty,
        export_json: args.export_json.clone(),
    })
}

pub fn sweep_config_from_args(args: &SweepArgs) -> Result<SweepConfig, AppError> {
    let constants = constants_from_args(&args.constants)?;
    let mut models = if args.models.is_empty() {
        ModelKind::ALL.to_vec()
    } else {
        args.models.clone()
    };
    models.sort();
    models.dedup();

    Ok(SweepConfig {
        constants,
        models,
        fixed_axis: args.fixed_axis,
        fixed_value: args.fixed_value,
        sweep: SweepSpec {
            variable: args.variable,
            start: args.start,
            end: args.end,
            steps: args.steps,
            spacing: args.spacing,
        },
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
    })
}

/// Rewrite argv so `ediff` defaults to `ediff tui`.
///
/// Rules:
/// - `ediff`                        -> `ediff tui`
/// - `ediff --temperature 310 ...`  -> `ediff tui --temperature 310 ...`
/// - `ediff --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "solve" | "compare" | "sweep" | "invert" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["ediff"])), argv(&["ediff", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["ediff", "--temperature", "310"])),
            argv(&["ediff", "tui", "--temperature", "310"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for v in [
            argv(&["ediff", "solve", "-k", "5"]),
            argv(&["ediff", "--help"]),
            argv(&["ediff", "-V"]),
        ] {
            assert_eq!(rewrite_args(v.clone()), v);
        }
    }

    #[test]
    fn sweep_config_defaults_to_all_models_and_honors_no_plot() {
        let cli = crate::cli::Cli::parse_from(["ediff", "sweep", "--no-plot", "--model", "modern,original,modern"]);
        let Command::Sweep(args) = cli.command else {
            panic!("expected sweep");
        };
        let cfg = sweep_config_from_args(&args).unwrap();
        assert_eq!(cfg.models, vec![ModelKind::Original, ModelKind::Modern]);
        assert!(!cfg.plot);

        let cli = crate::cli::Cli::parse_from(["ediff", "sweep"]);
        let Command::Sweep(args) = cli.command else {
            panic!("expected sweep");
        };
        assert_eq!(sweep_config_from_args(&args).unwrap().models, ModelKind::ALL.to_vec());
    }

    #[test]
    fn negative_sigma_is_rejected_with_domain_exit_code() {
        let cli = crate::cli::Cli::parse_from(["ediff", "solve", "-k", "5", "-d", "3e-11", "--sigma-d=-1"]);
        let Command::Solve(args) = cli.command else {
            panic!("expected solve");
        };
        let err = solve_config_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
