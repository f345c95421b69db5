//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - fit every enabled growth model to one measurement series (parallel)
//! - exclude models that cannot be fitted, with a reason
//! - select the best model by MSE (default) or BIC

pub mod fitter;
pub mod selection;

pub use fitter::*;
pub use selection::*;
