//! Linear least squares solver.
//!
//! Each Levenberg–Marquardt iteration solves a small, tall linear system of the form:
//!
//! ```text
//! minimize ‖A δ - b‖²
//! ```
//!
//! where `A` stacks the (column-scaled) Jacobian on top of the damping rows.
//!
//! Implementation choices:
//! - We use SVD to solve the least-squares problem robustly even when the
//!   matrix is tall (more rows than columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The parameter dimension is at most 2, so SVD cost is negligible.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
