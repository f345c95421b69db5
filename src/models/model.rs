//! Model evaluation for the growth-model library.
//!
//! The fitter relies on three primitive operations:
//! - predict `t(n)` given parameters (for residuals/plots)
//! - fill a Jacobian row `∂t/∂params` at a given size (for Levenberg–Marquardt)
//! - provide an initial parameter guess
//!
//! Every model except `O(1)` has the affine form `a·g(n) + b`, so the
//! Jacobian row is simply `[g(n), 1]`.

use crate::domain::ModelKind;

/// Growth basis `g(n)` for the model kind.
///
/// `n` is expected to be ≥ 1, where every basis is finite except `2ⁿ` for
/// large `n` (which overflows to infinity and is reported by the fitter).
pub fn basis(model: ModelKind, n: f64) -> f64 {
    match model {
        ModelKind::Constant => 1.0,
        ModelKind::Logarithmic => n.log2(),
        ModelKind::Linear => n,
        ModelKind::Linearithmic => n * n.log2(),
        ModelKind::Quadratic => n * n,
        ModelKind::Cubic => n * n * n,
        ModelKind::Exponential => n.exp2(),
    }
}

/// Predict the running time at size `n`.
///
/// Missing parameters (e.g. a hand-edited results file) yield NaN.
pub fn predict(model: ModelKind, n: f64, params: &[f64]) -> f64 {
    let param = |i: usize| params.get(i).copied().unwrap_or(f64::NAN);
    match model {
        ModelKind::Constant => param(0),
        _ => param(0) * basis(model, n) + param(1),
    }
}

/// Fill the Jacobian row for size `n`.
///
/// # Panics
/// Panics if `out` does not have length `model.arity()`.
pub fn fill_jacobian_row(model: ModelKind, n: f64, out: &mut [f64]) {
    match model {
        ModelKind::Constant => out[0] = 1.0,
        _ => {
            out[0] = basis(model, n);
            out[1] = 1.0;
        }
    }
}

/// Starting point for the local optimizer: all ones.
///
/// Levenberg–Marquardt is local; convergence to the global optimum is not
/// guaranteed in general. For the affine models here the first undamped step
/// already lands on the least-squares solution.
pub fn initial_guess(model: ModelKind) -> Vec<f64> {
    vec![1.0; model.arity()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_smoke() {
        assert_eq!(predict(ModelKind::Constant, 100.0, &[3.0]), 3.0);
        assert_eq!(predict(ModelKind::Linear, 10.0, &[2.0, 1.0]), 21.0);
        assert_eq!(predict(ModelKind::Quadratic, 10.0, &[2.0, 1.0]), 201.0);
        assert_eq!(predict(ModelKind::Cubic, 2.0, &[1.0, 0.0]), 8.0);
        assert_eq!(predict(ModelKind::Exponential, 10.0, &[1.0, 0.0]), 1024.0);
        assert_eq!(predict(ModelKind::Logarithmic, 8.0, &[1.0, 0.0]), 3.0);
        assert_eq!(predict(ModelKind::Linearithmic, 8.0, &[1.0, 0.0]), 24.0);
    }

    #[test]
    fn every_basis_is_finite_at_size_one() {
        for m in ModelKind::ALL {
            let v = basis(m, 1.0);
            assert!(v.is_finite(), "{m} is not finite at n=1");
        }
        assert_eq!(basis(ModelKind::Logarithmic, 1.0), 0.0);
    }

    #[test]
    fn exponential_overflows_for_large_sizes() {
        assert!(!basis(ModelKind::Exponential, 2000.0).is_finite());
    }

    #[test]
    fn jacobian_row_matches_basis() {
        let mut row = [0.0; 2];
        fill_jacobian_row(ModelKind::Linearithmic, 4.0, &mut row);
        assert_eq!(row, [8.0, 1.0]);

        let mut row = [0.0; 1];
        fill_jacobian_row(ModelKind::Constant, 4.0, &mut row);
        assert_eq!(row, [1.0]);
    }
}
