//! Reporting utilities: per-size residuals and formatted terminal output.

use crate::domain::{EstimationResult, ModelFit};

pub mod format;

pub use format::*;

/// Observed vs. predicted time at one measured size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Residual {
    pub size: usize,
    pub observed: f64,
    pub predicted: f64,
    /// `observed - predicted`
    pub residual: f64,
}

/// Residuals of the winning model, one per measurement, in measurement order.
pub fn compute_residuals(result: &EstimationResult) -> Vec<Residual> {
    residuals_for(result, &result.best)
}

/// Residuals of any fitted candidate against the same measurements.
pub fn residuals_for(result: &EstimationResult, fit: &ModelFit) -> Vec<Residual> {
    result
        .measurements
        .iter()
        .map(|m| {
            let predicted = fit.predict(m.size as f64);
            Residual {
                size: m.size,
                observed: m.seconds,
                predicted,
                residual: m.seconds - predicted,
            }
        })
        .collect()
}
