//! Levenberg–Marquardt nonlinear least squares.
//!
//! Minimizes `‖r(x)‖²` for a residual function `r: ℝᵏ → ℝᵐ` with a known Jacobian.
//!
//! Each iteration solves the damped Gauss–Newton step as an augmented linear
//! least-squares problem
//!
//! ```text
//! [ J·S⁻¹ ]        [ -r ]
//! [ √λ·I  ] δₛ  ≈  [  0 ]          δ = S⁻¹ δₛ
//! ```
//!
//! where `S = diag(‖J_j‖)` scales every Jacobian column to unit norm. Growth
//! bases span many orders of magnitude (`n³` next to a constant column), and
//! without the scaling the damping would act on wildly different units.
//!
//! Termination is explicit: the caller gets either a converged solution or an
//! [`LmError`], never a silently poor parameter vector.

use nalgebra::{DMatrix, DVector};

use crate::math::solve_least_squares;

const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e20;

/// Solver tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LmOptions {
    pub max_iterations: usize,
    /// Converged when the scaled step is below `xtol · (‖S·x‖ + xtol)`.
    pub xtol: f64,
    /// Converged when an accepted step reduces the cost by at most `ftol` (relative).
    pub ftol: f64,
    /// Initial damping factor.
    pub lambda: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            xtol: 1e-12,
            ftol: 1e-15,
            lambda: 1e-3,
        }
    }
}

/// A converged solution.
#[derive(Debug, Clone, PartialEq)]
pub struct LmSolution {
    pub params: Vec<f64>,
    /// Sum of squared residuals at `params`.
    pub sse: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LmError {
    /// Residual or Jacobian row `row` evaluated to NaN/infinity.
    #[error("non-finite evaluation at row {row}")]
    NonFinite { row: usize },

    #[error("singular system at iteration {iteration}")]
    Singular { iteration: usize },

    #[error("not converged after {iterations} iteration(s)")]
    NotConverged { iterations: usize },
}

/// Run Levenberg–Marquardt from `x0`.
///
/// - `m`: number of residuals
/// - `residuals(x, out)`: writes `r(x)` into `out` (length `m`)
/// - `jacobian(x, out)`: writes `∂r/∂x` into `out` (`m × k`)
pub fn levenberg_marquardt<R, J>(
    residuals: R,
    jacobian: J,
    x0: &[f64],
    m: usize,
    opts: &LmOptions,
) -> Result<LmSolution, LmError>
where
    R: Fn(&[f64], &mut [f64]),
    J: Fn(&[f64], &mut DMatrix<f64>),
{
    let k = x0.len();
    let mut x = DVector::from_column_slice(x0);

    let mut r = DVector::<f64>::zeros(m);
    residuals(x.as_slice(), r.as_mut_slice());
    check_vector(&r)?;
    let mut cost = r.norm_squared();

    let mut jac = DMatrix::<f64>::zeros(m, k);
    jacobian(x.as_slice(), &mut jac);
    check_matrix(&jac)?;

    let mut lambda = opts.lambda.max(LAMBDA_MIN);
    let mut r_new = DVector::<f64>::zeros(m);
    let mut iterations = 0usize;

    loop {
        if cost == 0.0 {
            return Ok(solution(&x, cost, iterations));
        }
        if iterations >= opts.max_iterations {
            return Err(LmError::NotConverged { iterations });
        }
        iterations += 1;

        let scales = column_scales(&jac);

        let mut a = DMatrix::<f64>::zeros(m + k, k);
        let mut b = DVector::<f64>::zeros(m + k);
        for i in 0..m {
            for j in 0..k {
                a[(i, j)] = jac[(i, j)] / scales[j];
            }
            b[i] = -r[i];
        }
        let damping = lambda.sqrt();
        for j in 0..k {
            a[(m + j, j)] = damping;
        }

        let step_scaled =
            solve_least_squares(&a, &b).ok_or(LmError::Singular { iteration: iterations })?;

        let x_scaled_norm = stable_norm(x.iter().zip(scales.iter()).map(|(xi, si)| xi * si));
        if stable_norm(step_scaled.iter().copied()) <= opts.xtol * (x_scaled_norm + opts.xtol) {
            return Ok(solution(&x, cost, iterations));
        }

        let x_new = DVector::from_iterator(
            k,
            x.iter()
                .zip(step_scaled.iter().zip(scales.iter()))
                .map(|(xi, (di, si))| xi + di / si),
        );
        residuals(x_new.as_slice(), r_new.as_mut_slice());
        let cost_new = r_new.norm_squared();

        if cost_new.is_finite() && cost_new < cost {
            let reduction = (cost - cost_new) / cost;
            x = x_new;
            std::mem::swap(&mut r, &mut r_new);
            cost = cost_new;
            jacobian(x.as_slice(), &mut jac);
            check_matrix(&jac)?;
            lambda = (lambda / 10.0).max(LAMBDA_MIN);
            if reduction <= opts.ftol {
                return Ok(solution(&x, cost, iterations));
            }
        } else {
            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                return Err(LmError::NotConverged { iterations });
            }
        }
    }
}

fn solution(x: &DVector<f64>, sse: f64, iterations: usize) -> LmSolution {
    LmSolution {
        params: x.iter().copied().collect(),
        sse,
        iterations,
    }
}

fn column_scales(jac: &DMatrix<f64>) -> Vec<f64> {
    jac.column_iter()
        .map(|col| {
            let norm = stable_norm(col.iter().copied());
            if norm.is_finite() && norm > 0.0 { norm } else { 1.0 }
        })
        .collect()
}

/// Euclidean norm that does not overflow for entries near `f64::MAX` (`2ⁿ` columns).
fn stable_norm(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let scale = values.clone().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }
    scale * values.map(|v| (v / scale).powi(2)).sum::<f64>().sqrt()
}

fn check_vector(v: &DVector<f64>) -> Result<(), LmError> {
    match v.iter().position(|x| !x.is_finite()) {
        Some(row) => Err(LmError::NonFinite { row }),
        None => Ok(()),
    }
}

fn check_matrix(m: &DMatrix<f64>) -> Result<(), LmError> {
    for (row, values) in m.row_iter().enumerate() {
        if values.iter().any(|x| !x.is_finite()) {
            return Err(LmError::NonFinite { row });
        }
    }
    Ok(())
}
