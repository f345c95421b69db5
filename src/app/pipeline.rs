//! Shared "analysis pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! resolve targets -> measure each -> estimate each -> collect per-function outcomes
//!
//! Functions are timed one after another (parallel timing would distort the
//! measurements); pre-recorded series are estimated in parallel.

use rayon::prelude::*;

use crate::domain::{
    EstimationResult, FitConfig, FunctionRecord, Measurement, MeasureConfig, ModelKind, ResultsFile,
};
use crate::error::AnalysisError;
use crate::fit::estimate_measurements;
use crate::harness::measure;
use crate::targets::Target;

/// Name written into exported results files.
pub const TOOL_NAME: &str = concat!("bigo ", env!("CARGO_PKG_VERSION"));

/// Result of analyzing one function.
#[derive(Debug, Clone)]
pub struct FunctionOutcome {
    pub name: String,
    /// Growth the function is written to exhibit, when known (registry targets).
    pub expected: Option<ModelKind>,
    pub result: Result<EstimationResult, AnalysisError>,
}

impl FunctionOutcome {
    pub fn estimate(&self) -> Option<&EstimationResult> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        self.result.as_ref().err()
    }
}

/// Per-function outcomes of one batch, in the order the functions were given.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FunctionOutcome>,
}

impl BatchReport {
    pub fn get(&self, name: &str) -> Option<&FunctionOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    /// Successful estimates as `(name, result)` pairs.
    pub fn estimates(&self) -> impl Iterator<Item = (&str, &EstimationResult)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.estimate().map(|r| (o.name.as_str(), r)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &AnalysisError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.error().map(|e| (o.name.as_str(), e)))
    }

    /// Exit code of the first failed function, if any.
    pub fn exit_code(&self) -> Option<u8> {
        self.failures().next().map(|(_, e)| e.exit_code())
    }

    pub fn to_results_file(&self, fit: &FitConfig) -> ResultsFile {
        ResultsFile {
            tool: TOOL_NAME.to_string(),
            generated_at: chrono::Utc::now(),
            criterion: fit.criterion,
            functions: self
                .outcomes
                .iter()
                .map(|o| FunctionRecord {
                    name: o.name.clone(),
                    estimate: o.estimate().cloned(),
                    error: o.error().map(|e| e.to_string()),
                })
                .collect(),
        }
    }
}

/// Measure and estimate one function.
pub fn analyze_function<F, R, E>(
    target: F,
    sizes: &[usize],
    measure_cfg: &MeasureConfig,
    fit_cfg: &FitConfig,
) -> Result<EstimationResult, AnalysisError>
where
    F: FnMut(&[u64]) -> Result<R, E>,
    E: std::fmt::Display,
{
    let measurements = measure(target, sizes, measure_cfg)?;
    Ok(estimate_measurements(&measurements, fit_cfg)?)
}

/// Analyze every target independently; one failure never stops the others.
pub fn analyze_batch(
    targets: &[&Target],
    sizes: &[usize],
    measure_cfg: &MeasureConfig,
    fit_cfg: &FitConfig,
) -> BatchReport {
    let outcomes = targets
        .iter()
        .map(|t| {
            let _span = tracing::info_span!("analyze", function = t.name).entered();
            let result = analyze_function(|input: &[u64]| t.call(input), sizes, measure_cfg, fit_cfg);
            log_outcome(t.name, &result);
            FunctionOutcome {
                name: t.name.to_string(),
                expected: Some(t.expected),
                result,
            }
        })
        .collect();
    BatchReport { outcomes }
}

/// Estimate pre-recorded series (e.g. loaded from CSV).
pub fn estimate_batch(series: &[(String, Vec<Measurement>)], fit_cfg: &FitConfig) -> BatchReport {
    let outcomes = series
        .par_iter()
        .map(|(name, measurements)| {
            let result = estimate_measurements(measurements, fit_cfg).map_err(AnalysisError::from);
            log_outcome(name, &result);
            FunctionOutcome {
                name: name.clone(),
                expected: None,
                result,
            }
        })
        .collect();
    BatchReport { outcomes }
}

fn log_outcome(name: &str, result: &Result<EstimationResult, AnalysisError>) {
    match result {
        Ok(r) => tracing::info!(function = name, model = %r.model(), mse = r.mse(), "estimated"),
        Err(e) => tracing::warn!(function = name, "analysis failed: {e}"),
    }
}
