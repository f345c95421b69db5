//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and initializes logging
//! - resolves configuration (CLI > environment > defaults)
//! - runs measurement + estimation per function
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, FitFileArgs, FitOptions, OutputOptions, PlotArgs, RunArgs};
use crate::config::EnvDefaults;
use crate::domain::{FitConfig, MeasureConfig, ModelKind};
use crate::error::AppError;

pub mod pipeline;

use pipeline::BatchReport;

/// Entry point for the `bigo` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::init(cli.verbose);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
        Command::List => handle_list(),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let env = EnvDefaults::from_env()?;
    let sizes = env.resolve_sizes(args.sizes.clone())?;
    let measure_cfg = measure_config_from_args(&args, &env)?;
    let fit_cfg = fit_config_from_args(&args.fit);

    let targets = crate::targets::resolve_all(&args.module, &args.functions)?;
    tracing::info!(
        module = %args.module,
        functions = targets.len(),
        sizes = ?sizes,
        "measuring"
    );

    let report = pipeline::analyze_batch(&targets, &sizes, &measure_cfg, &fit_cfg);
    finish(&report, &fit_cfg, &args.output, args.tui)
}

fn handle_fit(args: FitFileArgs) -> Result<(), AppError> {
    let fit_cfg = fit_config_from_args(&args.fit);
    let data = crate::io::load_measurements(&args.file)?;

    for e in &data.row_errors {
        eprintln!("line {}: {}", e.line, e.message);
    }
    if !data.row_errors.is_empty() {
        eprintln!(
            "Skipped {} of {} row(s).",
            data.row_errors.len(),
            data.rows_read
        );
    }

    let report = pipeline::estimate_batch(&data.series, &fit_cfg);
    finish(&report, &fit_cfg, &args.output, args.tui)
}

/// Print, plot and export a finished batch, then turn the first failure into the exit status.
fn finish(
    report: &BatchReport,
    fit_cfg: &FitConfig,
    output: &OutputOptions,
    tui: bool,
) -> Result<(), AppError> {
    // Exports first: a failed function still leaves a complete record on disk.
    if let Some(path) = &output.export_json {
        crate::io::write_results_json(path, &report.to_results_file(fit_cfg))?;
    }
    if let Some(path) = &output.export_csv {
        crate::io::write_results_csv(path, report)?;
    }

    if tui {
        crate::tui::run(report)?;
    } else {
        print!("{}", crate::report::format_batch(report, fit_cfg, output.residuals));

        if output.plot {
            for (name, result) in report.estimates() {
                println!("{name} ({})", result.name());
                println!(
                    "{}",
                    crate::plot::render_estimate_plot(result, None, output.width, output.height)
                );
            }
            let series: Vec<_> = report
                .estimates()
                .map(|(name, r)| (name, r.measurements.as_slice()))
                .collect();
            if series.len() > 1 {
                println!("Comparison:");
                println!(
                    "{}",
                    crate::plot::render_comparison_plot(&series, output.width, output.height)
                );
            }
        }
    }

    match report.failures().next() {
        Some((name, err)) => Err(AppError::new(err.exit_code(), format!("{name}: {err}"))),
        None => Ok(()),
    }
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let results = crate::io::read_results_json(&args.results)?;
    print!("{}", crate::plot::render_results(&results, args.width, args.height));
    Ok(())
}

fn handle_list() -> Result<(), AppError> {
    print!("{}", crate::report::format_registry(crate::targets::modules()));
    Ok(())
}

pub fn fit_config_from_args(args: &FitOptions) -> FitConfig {
    FitConfig {
        models: args
            .models
            .clone()
            .unwrap_or_else(|| ModelKind::ALL.to_vec()),
        criterion: args.criterion,
        max_iterations: args.max_iterations,
        flat_growth: args.flat_growth,
    }
}

pub fn measure_config_from_args(args: &RunArgs, env: &EnvDefaults) -> Result<MeasureConfig, AppError> {
    Ok(MeasureConfig {
        repeats: env.resolve_repeats(args.repeats)?,
        aggregate: args.aggregate,
        input: args.input,
        seed: args.seed,
        warmup: args.warmup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::{Aggregate, SelectionCriterion};

    fn run_args(argv: &[&str]) -> RunArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Run(args) => args,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn fit_config_defaults_to_every_model() {
        let args = run_args(&["bigo", "run", "growth", "linear"]);
        let cfg = fit_config_from_args(&args.fit);
        assert_eq!(cfg, FitConfig::default());
    }

    #[test]
    fn measure_config_takes_flags_over_environment() {
        let args = run_args(&[
            "bigo", "run", "growth", "linear", "--repeats", "5", "--aggregate", "min", "--warmup",
        ]);
        let env = EnvDefaults {
            sizes: None,
            repeats: Some(3),
        };
        let cfg = measure_config_from_args(&args, &env).unwrap();
        assert_eq!(cfg.repeats, 5);
        assert_eq!(cfg.aggregate, Aggregate::Min);
        assert!(cfg.warmup);

        let args = run_args(&["bigo", "run", "growth", "linear"]);
        assert_eq!(measure_config_from_args(&args, &env).unwrap().repeats, 3);
    }

    #[test]
    fn model_subset_and_criterion_flow_through() {
        let args = run_args(&[
            "bigo", "run", "growth", "linear", "--models", "quadratic,constant", "--criterion", "bic",
            "--flat-growth", "0.25",
        ]);
        let cfg = fit_config_from_args(&args.fit);
        assert_eq!(cfg.models, vec![ModelKind::Quadratic, ModelKind::Constant]);
        assert_eq!(cfg.criterion, SelectionCriterion::Bic);
        assert_eq!(cfg.flat_growth, 0.25);
    }
}
