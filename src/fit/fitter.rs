//! Low-level fitting routine for a single model kind.
//!
//! Given:
//! - input sizes `n_i`
//! - observed times `t_i`
//!
//! we run Levenberg–Marquardt from the model's initial guess and return the
//! fitted parameters with their SSE / MSE / BIC.

use nalgebra::DMatrix;

use crate::domain::{Measurement, ModelFit, ModelKind};
use crate::error::FitError;
use crate::math::{LmError, LmOptions, levenberg_marquardt};
use crate::models::{fill_jacobian_row, initial_guess, predict};

/// Fit a single model kind to the measurements.
///
/// Callers are expected to have validated the measurements (positive sizes,
/// finite non-negative times); see `selection::estimate`.
pub fn fit_model(
    model: ModelKind,
    measurements: &[Measurement],
    max_iterations: usize,
) -> Result<ModelFit, FitError> {
    let distinct = distinct_sizes(measurements);
    if distinct < model.arity() {
        return Err(FitError::Underdetermined {
            model,
            arity: model.arity(),
            distinct,
        });
    }

    let ns: Vec<f64> = measurements.iter().map(|m| m.size as f64).collect();
    let ts: Vec<f64> = measurements.iter().map(|m| m.seconds).collect();
    let m = ns.len();
    let k = model.arity();

    let residuals = |p: &[f64], out: &mut [f64]| {
        for i in 0..m {
            out[i] = predict(model, ns[i], p) - ts[i];
        }
    };
    let jacobian = |_: &[f64], out: &mut DMatrix<f64>| {
        let mut row = vec![0.0; k];
        for i in 0..m {
            fill_jacobian_row(model, ns[i], &mut row);
            for (j, v) in row.iter().enumerate() {
                out[(i, j)] = *v;
            }
        }
    };

    let opts = LmOptions {
        max_iterations,
        ..LmOptions::default()
    };
    let solution = levenberg_marquardt(residuals, jacobian, &initial_guess(model), m, &opts)
        .map_err(|e| match e {
            LmError::NonFinite { row } => FitError::NonFinite {
                size: measurements.get(row).map(|x| x.size).unwrap_or(0),
            },
            LmError::Singular { iteration } => FitError::Singular { iteration },
            LmError::NotConverged { iterations } => FitError::NotConverged { iterations },
        })?;

    // Recompute on the final parameters rather than trusting the solver's
    // running cost, so reported errors always match `predict`.
    let sse = sum_squared_error(model, &ns, &ts, &solution.params);
    if !sse.is_finite() {
        return Err(FitError::NonFinite {
            size: measurements.last().map(|x| x.size).unwrap_or(0),
        });
    }

    Ok(ModelFit {
        model,
        params: solution.params,
        sse,
        mse: sse / m as f64,
        bic: bic(m, sse, k),
        iterations: solution.iterations,
    })
}

/// Number of distinct input sizes in the series.
pub fn distinct_sizes(measurements: &[Measurement]) -> usize {
    let mut sizes: Vec<usize> = measurements.iter().map(|m| m.size).collect();
    sizes.sort_unstable();
    sizes.dedup();
    sizes.len()
}

fn sum_squared_error(model: ModelKind, ns: &[f64], ts: &[f64], params: &[f64]) -> f64 {
    ns.iter()
        .zip(ts.iter())
        .map(|(&n, &t)| {
            let r = predict(model, n, params) - t;
            r * r
        })
        .sum()
}

/// `BIC = n·ln(SSE/n) + k·ln(n)`.
///
/// Timings are tiny (seconds, often < 1e-6), so the SSE floor sits at the
/// smallest normal `f64` rather than at a fixed epsilon.
pub fn bic(n: usize, sse: f64, k: usize) -> f64 {
    let n_f = n as f64;
    let sse_per = (sse / n_f).max(f64::MIN_POSITIVE);
    n_f * sse_per.ln() + (k as f64) * n_f.ln()
}
