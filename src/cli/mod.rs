//! Command-line parsing for the complexity estimator.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! measurement and fitting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    Aggregate, DEFAULT_FLAT_GROWTH, DEFAULT_MAX_ITERATIONS, InputKind, ModelKind, SelectionCriterion,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "bigo",
    version,
    about = "Empirical time-complexity estimator: time a function over input sizes and fit growth models"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Time registered functions over a list of input sizes and estimate their complexity.
    Run(RunArgs),
    /// Estimate complexity from recorded measurements (CSV).
    Fit(FitFileArgs),
    /// Plot a previously exported results JSON.
    Plot(PlotArgs),
    /// List available modules and functions.
    List,
}

/// Options for timing registered functions.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Module containing the functions (see `bigo list`).
    #[arg(value_name = "MODULE")]
    pub module: String,

    /// One or more functions of the module.
    #[arg(value_name = "FUNCTION", required = true, num_args = 1..)]
    pub functions: Vec<String>,

    /// Input sizes (positive, non-decreasing). Defaults to $BIGO_SIZES or 10,100,500,1000,2000.
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub sizes: Option<Vec<usize>>,

    /// Timed calls per size. Defaults to $BIGO_REPEATS or 1.
    #[arg(long)]
    pub repeats: Option<usize>,

    /// How repeated timings of one size are combined.
    #[arg(long, value_enum, default_value_t = Aggregate::Mean)]
    pub aggregate: Aggregate,

    /// Shape of the generated input.
    #[arg(long, value_enum, default_value_t = InputKind::Ascending)]
    pub input: InputKind,

    /// Seed for shuffled/random inputs.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Run one untimed call per size before timing.
    #[arg(long)]
    pub warmup: bool,

    #[command(flatten)]
    pub fit: FitOptions,

    #[command(flatten)]
    pub output: OutputOptions,

    /// Browse the results in an interactive terminal UI.
    #[arg(long)]
    pub tui: bool,
}

/// Options for estimating from a measurements file.
#[derive(Debug, Args, Clone)]
pub struct FitFileArgs {
    /// CSV with columns `size`, `seconds` and optionally `function`.
    #[arg(long, value_name = "CSV")]
    pub file: PathBuf,

    #[command(flatten)]
    pub fit: FitOptions,

    #[command(flatten)]
    pub output: OutputOptions,

    /// Browse the results in an interactive terminal UI.
    #[arg(long)]
    pub tui: bool,
}

/// Fitting-engine options shared by `run` and `fit`.
#[derive(Debug, Args, Clone)]
pub struct FitOptions {
    /// Restrict the candidate models (comma-separated).
    #[arg(long, value_enum, value_delimiter = ',')]
    pub models: Option<Vec<ModelKind>>,

    /// Model-selection criterion.
    #[arg(long, value_enum, default_value_t = SelectionCriterion::Mse)]
    pub criterion: SelectionCriterion,

    /// Levenberg–Marquardt iteration budget per model.
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,

    /// Report O(1) when the winning curve rises by at most this multiple of the
    /// mean time over the measured sizes (0 disables).
    #[arg(long, default_value_t = DEFAULT_FLAT_GROWTH)]
    pub flat_growth: f64,
}

/// Output options shared by `run` and `fit`.
#[derive(Debug, Args, Clone)]
pub struct OutputOptions {
    /// Render ASCII plots in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Print the per-size residual table of each winner.
    #[arg(long)]
    pub residuals: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export all results (estimates, candidates, errors) to JSON.
    #[arg(long, value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export per-size observed/predicted rows to CSV.
    #[arg(long, value_name = "CSV")]
    pub export_csv: Option<PathBuf>,
}

/// Options for plotting a saved results file.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Results JSON produced by `--export-json`.
    #[arg(long, value_name = "JSON")]
    pub results: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
