//! Error types.
//!
//! Library code reports failures through small `thiserror` enums, one per
//! concern. The binary maps all of them onto [`AppError`], which carries the
//! process exit code:
//!
//! - `2` usage / configuration / IO
//! - `3` insufficient data (no model could be fitted)
//! - `4` runtime failure (target function failed, terminal errors)

use crate::domain::{ModelKind, SkippedModel};

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failure to fit one growth model. Recoverable: the model is excluded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    /// Fewer distinct input sizes than free parameters.
    #[error("underdetermined: {model} has {arity} parameter(s) but only {distinct} distinct size(s)")]
    Underdetermined {
        model: ModelKind,
        arity: usize,
        distinct: usize,
    },

    /// The model produced NaN or infinity (typically `2^n` overflow).
    #[error("non-finite prediction (overflow) at n={size}")]
    NonFinite { size: usize },

    /// The damped normal system could not be solved.
    #[error("singular least-squares system at iteration {iteration}")]
    Singular { iteration: usize },

    /// Iteration budget exhausted or damping diverged before convergence.
    #[error("did not converge after {iterations} iteration(s)")]
    NotConverged { iterations: usize },
}

/// Failure of a whole estimation over one measurement series.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EstimateError {
    #[error("sizes and times differ in length ({sizes} vs {times})")]
    LengthMismatch { sizes: usize, times: usize },

    #[error("invalid measurement at index {index}: {reason}")]
    InvalidMeasurement { index: usize, reason: String },

    #[error("flat growth threshold must be finite and non-negative (got {value})")]
    InvalidFlatGrowth { value: f64 },

    #[error("no fittable model ({} candidate(s) excluded{})", .skipped.len(), first_reason(.skipped))]
    NoFittableModel { skipped: Vec<SkippedModel> },
}

fn first_reason(skipped: &[SkippedModel]) -> String {
    skipped
        .first()
        .map(|s| format!("; {}: {}", s.model, s.reason))
        .unwrap_or_default()
}

/// Failure while timing a target function.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MeasureError {
    #[error("no input sizes given")]
    EmptySizes,

    #[error("input size at position {index} must be positive")]
    InvalidSize { index: usize },

    #[error("target failed at n={size}: {message}")]
    TargetFailed { size: usize, message: String },

    #[error("target panicked at n={size}: {message}")]
    TargetPanicked { size: usize, message: String },
}

/// Function lookup failure in the target registry.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown module '{name}' (available: {})", .available.join(", "))]
    UnknownModule { name: String, available: Vec<String> },

    #[error("unknown function '{module}::{name}' (available: {})", .available.join(", "))]
    UnknownFunction {
        module: String,
        name: String,
        available: Vec<String>,
    },
}

/// Per-function failure inside a batch.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Measure(#[from] MeasureError),

    #[error(transparent)]
    Estimate(#[from] EstimateError),
}

impl AnalysisError {
    /// Exit code this failure maps to when it decides the process status.
    pub fn exit_code(&self) -> u8 {
        match self {
            AnalysisError::Measure(MeasureError::EmptySizes | MeasureError::InvalidSize { .. }) => 2,
            AnalysisError::Measure(_) => 4,
            AnalysisError::Estimate(EstimateError::NoFittableModel { .. }) => 3,
            AnalysisError::Estimate(_) => 2,
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        AppError::new(2, err.to_string())
    }
}

impl From<EstimateError> for AppError {
    fn from(err: EstimateError) -> Self {
        AnalysisError::from(err).into()
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_error_messages() {
        let err = FitError::NonFinite { size: 2000 };
        assert_eq!(err.to_string(), "non-finite prediction (overflow) at n=2000");

        let err = FitError::Underdetermined {
            model: ModelKind::Linear,
            arity: 2,
            distinct: 1,
        };
        assert_eq!(
            err.to_string(),
            "underdetermined: O(n) has 2 parameter(s) but only 1 distinct size(s)"
        );
    }

    #[test]
    fn no_fittable_model_mentions_first_reason() {
        let err = EstimateError::NoFittableModel {
            skipped: vec![SkippedModel {
                model: ModelKind::Constant,
                reason: "no positive timings".to_string(),
            }],
        };
        assert_eq!(
            err.to_string(),
            "no fittable model (1 candidate(s) excluded; O(1): no positive timings)"
        );
    }

    #[test]
    fn analysis_error_exit_codes() {
        let err = AnalysisError::from(MeasureError::TargetFailed {
            size: 10,
            message: "boom".to_string(),
        });
        assert_eq!(err.exit_code(), 4);

        let err = AnalysisError::from(EstimateError::NoFittableModel { skipped: vec![] });
        assert_eq!(err.exit_code(), 3);

        let err = AnalysisError::from(EstimateError::InvalidFlatGrowth { value: -1.0 });
        assert_eq!(err.exit_code(), 2);

        let app: AppError = RegistryError::UnknownModule {
            name: "x".to_string(),
            available: vec!["growth".to_string()],
        }
        .into();
        assert_eq!(app.exit_code(), 2);
        assert_eq!(app.to_string(), "unknown module 'x' (available: growth)");
    }

    #[test]
    fn errors_are_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<FitError>();
        assert_impl::<EstimateError>();
        assert_impl::<MeasureError>();
        assert_impl::<AnalysisError>();
    }
}
