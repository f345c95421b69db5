//! Integration tests for batch analysis: functions succeed or fail independently.

use complexity_estimator::app::pipeline::{analyze_batch, estimate_batch};
use complexity_estimator::domain::{FitConfig, MeasureConfig, Measurement, ModelKind};
use complexity_estimator::error::{AnalysisError, EstimateError, MeasureError};
use complexity_estimator::targets::{Target, TargetError, resolve};

const SIZES: [usize; 4] = [1_000, 5_000, 10_000, 20_000];

fn fails_from_5000(input: &[u64]) -> Result<u64, TargetError> {
    if input.len() >= 5_000 {
        return Err(TargetError(format!("refusing {} elements", input.len())));
    }
    Ok(input.iter().fold(0u64, |acc, &x| acc.wrapping_add(x)))
}

fn panics_from_5000(input: &[u64]) -> Result<u64, TargetError> {
    assert!(input.len() < 5_000, "input too large");
    Ok(input.len() as u64)
}

const FAILING: Target = Target {
    name: "failing",
    summary: "errors for n >= 5000",
    expected: ModelKind::Linear,
    run: fails_from_5000,
};

const PANICKING: Target = Target {
    name: "panicking",
    summary: "panics for n >= 5000",
    expected: ModelKind::Constant,
    run: panics_from_5000,
};

#[test]
fn failing_function_does_not_block_the_others() {
    let linear = resolve("growth", "linear").unwrap();
    let targets = [&FAILING, linear];
    let report = analyze_batch(&targets, &SIZES, &MeasureConfig::default(), &FitConfig::default());

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.outcomes[0].name, "failing");
    assert_eq!(report.outcomes[1].name, "linear");

    assert!(matches!(
        report.get("failing").unwrap().error(),
        Some(AnalysisError::Measure(MeasureError::TargetFailed { size: 5_000, .. }))
    ));
    let ok = report.get("linear").unwrap();
    assert!(ok.estimate().is_some(), "linear failed: {:?}", ok.error());
    assert_eq!(ok.expected, Some(ModelKind::Linear));
    assert_eq!(report.exit_code(), Some(4));
}

#[test]
fn panicking_function_is_reported_not_propagated() {
    let linear = resolve("growth", "linear").unwrap();
    let targets = [linear, &PANICKING];
    let report = analyze_batch(&targets, &SIZES, &MeasureConfig::default(), &FitConfig::default());

    let err = report.get("panicking").unwrap().error().unwrap();
    match err {
        AnalysisError::Measure(MeasureError::TargetPanicked { size, message }) => {
            assert_eq!(*size, 5_000);
            assert!(message.contains("input too large"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(report.get("linear").unwrap().estimate().is_some());
    assert_eq!(report.estimates().count(), 1);
    assert_eq!(report.failures().count(), 1);
}

#[test]
fn measured_series_covers_every_size() {
    let target = resolve("sorting", "std_sort").unwrap();
    let report = analyze_batch(&[target], &SIZES, &MeasureConfig::default(), &FitConfig::default());

    let result = report.get("std_sort").unwrap().estimate().unwrap();
    assert_eq!(result.sizes(), SIZES.to_vec());
    assert!(result.times().iter().all(|t| t.is_finite() && *t >= 0.0));
    assert_eq!(result.candidates.len() + result.skipped.len(), ModelKind::ALL.len());
}

#[test]
fn recorded_series_are_estimated_independently() {
    let cubic: Vec<Measurement> = [10usize, 20, 40, 80, 160]
        .iter()
        .map(|&n| Measurement::new(n, 2e-9 * (n as f64).powi(3) + 1e-6))
        .collect();
    let flat: Vec<Measurement> = [10usize, 10, 10]
        .iter()
        .map(|&n| Measurement::new(n, 1e-3))
        .collect();
    let series = vec![("cubic".to_string(), cubic), ("flat".to_string(), flat)];

    let report = estimate_batch(&series, &FitConfig::default());

    assert_eq!(
        report.get("cubic").unwrap().estimate().unwrap().model(),
        ModelKind::Cubic
    );
    assert!(matches!(
        report.get("flat").unwrap().error(),
        Some(AnalysisError::Estimate(EstimateError::NoFittableModel { .. }))
    ));
    assert_eq!(report.exit_code(), Some(3));
}
