//! Model selection across the growth-model library.
//!
//! The engine fits each enabled model and computes:
//! - SSE / MSE
//! - BIC = n * ln(SSE/n) + k * ln(n)
//!
//! Selection rules:
//! 1. Validate the series; models that cannot be fitted are excluded with a reason
//! 2. `mse`: choose the minimum MSE; values within a scale-relative tolerance of
//!    the minimum count as ties and go to the earliest model in library order
//! 3. `bic`: choose the minimum BIC; if a simpler model is within 2 BIC points,
//!    pick the simpler model
//! 4. Flatness guardrail (both criteria): every `a·g(n) + b` model contains O(1)
//!    as `a = 0`, so on noisy flat timings one of them always edges out O(1).
//!    A winner whose fitted rise over the measured sizes is at most
//!    `flat_growth · mean(t)` is replaced by the O(1) fit.

use rayon::prelude::*;

use crate::domain::{
    EstimationResult, FitConfig, Measurement, ModelFit, ModelKind, SelectionCriterion, SkippedModel,
};
use crate::error::EstimateError;
use crate::fit::fitter::{distinct_sizes, fit_model};

/// MSE values closer than `MSE_TIE_RELATIVE · mean(t²)` are indistinguishable.
const MSE_TIE_RELATIVE: f64 = 1e-9;

/// BIC margin within which the simpler model is preferred.
const BIC_MARGIN: f64 = 2.0;

/// Minimum number of distinct input sizes for any estimate.
const MIN_DISTINCT_SIZES: usize = 2;

/// Estimate the growth model of parallel `sizes` / `times` slices.
pub fn estimate(sizes: &[usize], times: &[f64], config: &FitConfig) -> Result<EstimationResult, EstimateError> {
    if sizes.len() != times.len() {
        return Err(EstimateError::LengthMismatch {
            sizes: sizes.len(),
            times: times.len(),
        });
    }
    let measurements: Vec<Measurement> = sizes
        .iter()
        .zip(times.iter())
        .map(|(&n, &t)| Measurement::new(n, t))
        .collect();
    estimate_measurements(&measurements, config)
}

/// Estimate the growth model of a measurement series.
///
/// Measurements are used in the order given; they are never sorted or deduplicated.
pub fn estimate_measurements(
    measurements: &[Measurement],
    config: &FitConfig,
) -> Result<EstimationResult, EstimateError> {
    validate(measurements)?;
    if !(config.flat_growth.is_finite() && config.flat_growth >= 0.0) {
        return Err(EstimateError::InvalidFlatGrowth {
            value: config.flat_growth,
        });
    }

    let models = enabled_models(config);
    let mut skipped = Vec::new();

    if let Some(reason) = unfittable_reason(measurements) {
        for model in models {
            skipped.push(SkippedModel {
                model,
                reason: reason.clone(),
            });
        }
        return Err(EstimateError::NoFittableModel { skipped });
    }

    // Each fit is independent (own initial guess, own buffers), so models run in
    // parallel; `collect` keeps library order.
    let outcomes: Vec<_> = models
        .par_iter()
        .map(|&model| (model, fit_model(model, measurements, config.max_iterations)))
        .collect();

    let mut candidates = Vec::with_capacity(outcomes.len());
    for (model, outcome) in outcomes {
        match outcome {
            Ok(fit) => {
                tracing::debug!(
                    model = %model,
                    iterations = fit.iterations,
                    mse = fit.mse,
                    "model fitted"
                );
                candidates.push(fit);
            }
            Err(err) => {
                tracing::warn!(model = %model, "model excluded: {err}");
                skipped.push(SkippedModel {
                    model,
                    reason: err.to_string(),
                });
            }
        }
    }

    if candidates.is_empty() {
        return Err(EstimateError::NoFittableModel { skipped });
    }

    let selected = match config.criterion {
        SelectionCriterion::Mse => select_by_mse(&candidates, mse_tolerance(measurements)),
        SelectionCriterion::Bic => select_by_bic(&candidates),
    };
    let best = apply_flat_guardrail(selected, &candidates, measurements, config.flat_growth).clone();

    Ok(EstimationResult {
        best,
        candidates,
        skipped,
        measurements: measurements.to_vec(),
    })
}

fn validate(measurements: &[Measurement]) -> Result<(), EstimateError> {
    for (index, m) in measurements.iter().enumerate() {
        if m.size == 0 {
            return Err(EstimateError::InvalidMeasurement {
                index,
                reason: "input size must be at least 1".to_string(),
            });
        }
        if !m.seconds.is_finite() {
            return Err(EstimateError::InvalidMeasurement {
                index,
                reason: format!("time is not finite ({})", m.seconds),
            });
        }
        if m.seconds < 0.0 {
            return Err(EstimateError::InvalidMeasurement {
                index,
                reason: format!("time is negative ({})", m.seconds),
            });
        }
    }
    Ok(())
}

/// Series-level reasons that exclude every model at once.
fn unfittable_reason(measurements: &[Measurement]) -> Option<String> {
    let distinct = distinct_sizes(measurements);
    if distinct < MIN_DISTINCT_SIZES {
        return Some(format!(
            "insufficient data: {distinct} distinct input size(s), need at least {MIN_DISTINCT_SIZES}"
        ));
    }
    if !measurements.iter().any(|m| m.seconds > 0.0) {
        return Some("no positive timings".to_string());
    }
    None
}

/// Enabled models in library order, without duplicates.
fn enabled_models(config: &FitConfig) -> Vec<ModelKind> {
    ModelKind::ALL
        .into_iter()
        .filter(|m| config.models.contains(m))
        .collect()
}

fn mse_tolerance(measurements: &[Measurement]) -> f64 {
    let n = measurements.len().max(1) as f64;
    let mean_sq = measurements.iter().map(|m| m.seconds * m.seconds).sum::<f64>() / n;
    MSE_TIE_RELATIVE * mean_sq
}

/// Minimum MSE; near-ties resolved in favor of the earliest library model.
///
/// `fits` must be non-empty and in library order.
fn select_by_mse(fits: &[ModelFit], tolerance: f64) -> &ModelFit {
    let min_mse = fits.iter().map(|f| f.mse).fold(f64::INFINITY, f64::min);
    fits.iter()
        .find(|f| f.mse <= min_mse + tolerance)
        .unwrap_or(&fits[0])
}

/// Replace a non-constant winner by the O(1) fit when its curve barely rises.
///
/// The rise is measured on the fitted curve between the smallest and largest
/// size, relative to the mean observed time. The O(1) fit must be a candidate.
fn apply_flat_guardrail<'a>(
    selected: &'a ModelFit,
    fits: &'a [ModelFit],
    measurements: &[Measurement],
    flat_growth: f64,
) -> &'a ModelFit {
    if selected.model == ModelKind::Constant || flat_growth <= 0.0 {
        return selected;
    }
    let Some(constant) = fits.iter().find(|f| f.model == ModelKind::Constant) else {
        return selected;
    };

    let n_min = measurements.iter().map(|m| m.size).min().unwrap_or(1) as f64;
    let n_max = measurements.iter().map(|m| m.size).max().unwrap_or(1) as f64;
    let rise = (selected.predict(n_max) - selected.predict(n_min)).abs();
    let mean_t = measurements.iter().map(|m| m.seconds).sum::<f64>() / measurements.len().max(1) as f64;

    if rise.is_finite() && rise <= flat_growth * mean_t {
        tracing::debug!(
            model = %selected.model,
            rise,
            mean_t,
            "fitted curve is flat; reporting O(1)"
        );
        constant
    } else {
        selected
    }
}

/// Minimum BIC, preferring simplicity if within 2 BIC points.
///
/// `fits` must be non-empty and in library order.
fn select_by_bic(fits: &[ModelFit]) -> &ModelFit {
    let mut best = &fits[0];
    for f in &fits[1..] {
        if f.bic < best.bic {
            best = f;
        }
    }

    let best_bic = best.bic;

    // Iterate in order of increasing complexity and pick the first fit that is
    // "close enough" to the best.
    fits.iter()
        .find(|f| f.bic <= best_bic + BIC_MARGIN)
        .unwrap_or(best)
}
