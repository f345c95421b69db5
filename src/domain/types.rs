//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during measurement and fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::predict;

/// Input sizes used when neither the CLI nor the environment provides any.
pub const DEFAULT_SIZES: [usize; 5] = [10, 100, 500, 1000, 2000];

/// Default Levenberg–Marquardt iteration budget per model.
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

/// Default flatness threshold, as a multiple of the mean observed time.
pub const DEFAULT_FLAT_GROWTH: f64 = 1.0;

/// One candidate growth model from the fixed library.
///
/// Variant order is the library order, which is also the tie-break order
/// during selection (simplest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// `a`
    #[value(name = "constant", alias = "1")]
    Constant,
    /// `a·log2(n) + b`
    #[value(name = "log", alias = "logarithmic")]
    Logarithmic,
    /// `a·n + b`
    #[value(name = "linear", alias = "n")]
    Linear,
    /// `a·n·log2(n) + b`
    #[value(name = "nlogn", alias = "linearithmic")]
    Linearithmic,
    /// `a·n² + b`
    #[value(name = "quadratic", alias = "n2")]
    Quadratic,
    /// `a·n³ + b`
    #[value(name = "cubic", alias = "n3")]
    Cubic,
    /// `a·2ⁿ + b`
    #[value(name = "exponential", alias = "2n")]
    Exponential,
}

impl ModelKind {
    /// The full library, in selection order.
    pub const ALL: [ModelKind; 7] = [
        ModelKind::Constant,
        ModelKind::Logarithmic,
        ModelKind::Linear,
        ModelKind::Linearithmic,
        ModelKind::Quadratic,
        ModelKind::Cubic,
        ModelKind::Exponential,
    ];

    /// Big-O label, used as the model's identity in reports.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Constant => "O(1)",
            ModelKind::Logarithmic => "O(log n)",
            ModelKind::Linear => "O(n)",
            ModelKind::Linearithmic => "O(n log n)",
            ModelKind::Quadratic => "O(n^2)",
            ModelKind::Cubic => "O(n^3)",
            ModelKind::Exponential => "O(2^n)",
        }
    }

    /// Number of free parameters.
    pub fn arity(self) -> usize {
        match self {
            ModelKind::Constant => 1,
            _ => 2,
        }
    }

    /// Position in the library (0 = simplest).
    pub fn rank(self) -> usize {
        ModelKind::ALL
            .iter()
            .position(|&m| m == self)
            .unwrap_or(ModelKind::ALL.len())
    }

    /// Parse a Big-O label such as `"O(n log n)"` back into a model kind.
    pub fn from_display_name(name: &str) -> Option<Self> {
        ModelKind::ALL
            .into_iter()
            .find(|m| m.display_name() == name.trim())
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Criterion used to pick the winning model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SelectionCriterion {
    /// Smallest mean squared error; near-ties go to the simpler model.
    Mse,
    /// Bayesian information criterion; within 2 points, the simpler model wins.
    Bic,
}

/// Shape of the generated input handed to the target function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// `0, 1, ..., n-1`
    Ascending,
    /// `n-1, ..., 1, 0`
    Descending,
    /// A seeded permutation of `0..n`.
    Shuffled,
    /// Seeded uniform values in `0..n`.
    Random,
}

/// How repeated timings of one size collapse into one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    Mean,
    Median,
    Min,
}

/// One timed observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Input size `n` (always ≥ 1).
    pub size: usize,
    /// Elapsed wall-clock time in seconds.
    pub seconds: f64,
}

impl Measurement {
    pub fn new(size: usize, seconds: f64) -> Self {
        Self { size, seconds }
    }
}

/// Fitted parameters and fit quality for one model on one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFit {
    pub model: ModelKind,
    /// `[a]` for `O(1)`, `[a, b]` otherwise.
    pub params: Vec<f64>,
    pub sse: f64,
    pub mse: f64,
    pub bic: f64,
    /// Levenberg–Marquardt iterations used.
    pub iterations: usize,
}

impl ModelFit {
    /// Predicted time at size `n`.
    pub fn predict(&self, n: f64) -> f64 {
        predict(self.model, n, &self.params)
    }

    /// Leading coefficient `a`.
    pub fn leading(&self) -> f64 {
        self.params.first().copied().unwrap_or(f64::NAN)
    }
}

/// A model excluded from selection, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedModel {
    pub model: ModelKind,
    pub reason: String,
}

/// Output of one estimation: the winner plus everything needed to explain it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    pub best: ModelFit,
    /// Every successfully fitted model, in library order.
    pub candidates: Vec<ModelFit>,
    pub skipped: Vec<SkippedModel>,
    pub measurements: Vec<Measurement>,
}

impl EstimationResult {
    pub fn model(&self) -> ModelKind {
        self.best.model
    }

    /// Big-O label of the winner.
    pub fn name(&self) -> &'static str {
        self.best.model.display_name()
    }

    pub fn params(&self) -> &[f64] {
        &self.best.params
    }

    pub fn mse(&self) -> f64 {
        self.best.mse
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.measurements.iter().map(|m| m.size).collect()
    }

    pub fn times(&self) -> Vec<f64> {
        self.measurements.iter().map(|m| m.seconds).collect()
    }

    /// Observed `(n, seconds)` points, ready for a plotting layer.
    pub fn series(&self) -> Vec<(f64, f64)> {
        self.measurements
            .iter()
            .map(|m| (m.size as f64, m.seconds))
            .collect()
    }

    /// The candidate fit for `model`, if it was fitted.
    pub fn candidate(&self, model: ModelKind) -> Option<&ModelFit> {
        self.candidates.iter().find(|c| c.model == model)
    }

    /// Sample the winning curve on `points` evenly spaced sizes over the measured range.
    pub fn fitted_curve(&self, points: usize) -> Vec<(f64, f64)> {
        self.curve_for(&self.best, points)
    }

    /// Sample any fitted candidate's curve over the measured range.
    pub fn curve_for(&self, fit: &ModelFit, points: usize) -> Vec<(f64, f64)> {
        let (n0, n1) = self.size_range();
        let points = points.max(2);
        (0..points)
            .map(|i| {
                let u = i as f64 / (points as f64 - 1.0);
                let n = n0 + u * (n1 - n0);
                (n, fit.predict(n))
            })
            .collect()
    }

    fn size_range(&self) -> (f64, f64) {
        let min = self.measurements.iter().map(|m| m.size).min().unwrap_or(1);
        let max = self.measurements.iter().map(|m| m.size).max().unwrap_or(1);
        (min as f64, max as f64)
    }
}

/// Fitting-engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    /// Models to try, in library order.
    pub models: Vec<ModelKind>,
    pub criterion: SelectionCriterion,
    pub max_iterations: usize,
    /// A winner whose fitted curve rises by at most `flat_growth · mean(t)`
    /// across the measured sizes is reported as O(1). `0` disables the rule.
    pub flat_growth: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            models: ModelKind::ALL.to_vec(),
            criterion: SelectionCriterion::Mse,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            flat_growth: DEFAULT_FLAT_GROWTH,
        }
    }
}

/// Measurement-harness settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureConfig {
    /// Timed calls per size (at least 1).
    pub repeats: usize,
    pub aggregate: Aggregate,
    pub input: InputKind,
    /// Seed for `shuffled` / `random` inputs.
    pub seed: u64,
    /// Run one untimed call per size before timing.
    pub warmup: bool,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            repeats: 1,
            aggregate: Aggregate::Mean,
            input: InputKind::Ascending,
            seed: 42,
            warmup: false,
        }
    }
}

/// A saved results file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub criterion: SelectionCriterion,
    pub functions: Vec<FunctionRecord>,
}

/// One function's outcome inside a [`ResultsFile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<EstimationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
