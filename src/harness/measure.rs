//! Timing loop.

use std::fmt::Display;
use std::hint::black_box;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use crate::domain::{Aggregate, Measurement, MeasureConfig};
use crate::error::MeasureError;
use crate::harness::generate_input;

/// Time `target` once per size (or `config.repeats` times, aggregated).
///
/// The input for each size is generated before the clock starts; only the call
/// itself is timed. The target's output is passed through [`black_box`] and
/// dropped. The returned series has one measurement per size, in the order given.
pub fn measure<F, R, E>(
    mut target: F,
    sizes: &[usize],
    config: &MeasureConfig,
) -> Result<Vec<Measurement>, MeasureError>
where
    F: FnMut(&[u64]) -> Result<R, E>,
    E: Display,
{
    validate_sizes(sizes)?;
    let repeats = config.repeats.max(1);

    let mut measurements = Vec::with_capacity(sizes.len());
    for &size in sizes {
        let input = generate_input(config.input, size, config.seed);

        if config.warmup {
            invoke(&mut target, &input, size)?;
        }

        let mut samples = Vec::with_capacity(repeats);
        for _ in 0..repeats {
            let start = Instant::now();
            let outcome = invoke(&mut target, &input, size);
            let elapsed = start.elapsed().as_secs_f64();
            outcome?;
            samples.push(elapsed);
        }

        let seconds = aggregate(&mut samples, config.aggregate);
        tracing::debug!(size, repeats, seconds, "timed");
        measurements.push(Measurement::new(size, seconds));
    }

    Ok(measurements)
}

/// Reject an empty size list or a zero size.
pub fn validate_sizes(sizes: &[usize]) -> Result<(), MeasureError> {
    if sizes.is_empty() {
        return Err(MeasureError::EmptySizes);
    }
    match sizes.iter().position(|&n| n == 0) {
        Some(index) => Err(MeasureError::InvalidSize { index }),
        None => Ok(()),
    }
}

/// Collapse repeated timings of one size into one value.
///
/// `samples` must be non-empty; it is reordered for `Median`.
pub fn aggregate(samples: &mut [f64], how: Aggregate) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    match how {
        Aggregate::Mean => samples.iter().sum::<f64>() / samples.len() as f64,
        Aggregate::Min => samples.iter().copied().fold(f64::INFINITY, f64::min),
        Aggregate::Median => {
            samples.sort_by(|a, b| a.total_cmp(b));
            let mid = samples.len() / 2;
            if samples.len() % 2 == 0 {
                (samples[mid - 1] + samples[mid]) / 2.0
            } else {
                samples[mid]
            }
        }
    }
}

fn invoke<F, R, E>(target: &mut F, input: &[u64], size: usize) -> Result<(), MeasureError>
where
    F: FnMut(&[u64]) -> Result<R, E>,
    E: Display,
{
    match catch_unwind(AssertUnwindSafe(|| target(input))) {
        Ok(Ok(output)) => {
            black_box(output);
            Ok(())
        }
        Ok(Err(err)) => Err(MeasureError::TargetFailed {
            size,
            message: err.to_string(),
        }),
        Err(payload) => Err(MeasureError::TargetPanicked {
            size,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InputKind;

    #[test]
    fn one_measurement_per_size_in_order() {
        let sizes = [5, 1, 3];
        let mut seen = Vec::new();
        let series = measure(
            |input: &[u64]| {
                seen.push(input.len());
                Ok::<_, String>(input.iter().sum::<u64>())
            },
            &sizes,
            &MeasureConfig::default(),
        )
        .unwrap();

        assert_eq!(series.iter().map(|m| m.size).collect::<Vec<_>>(), vec![5, 1, 3]);
        assert!(series.iter().all(|m| m.seconds >= 0.0 && m.seconds.is_finite()));
        assert_eq!(seen, vec![5, 1, 3]);
    }

    #[test]
    fn repeats_and_warmup_call_the_target_again() {
        let mut calls = 0;
        let config = MeasureConfig {
            repeats: 3,
            warmup: true,
            aggregate: Aggregate::Median,
            ..MeasureConfig::default()
        };
        measure(
            |_: &[u64]| {
                calls += 1;
                Ok::<_, String>(())
            },
            &[10, 20],
            &config,
        )
        .unwrap();
        assert_eq!(calls, 8);
    }

    #[test]
    fn input_kind_reaches_the_target() {
        let config = MeasureConfig {
            input: InputKind::Descending,
            ..MeasureConfig::default()
        };
        let mut first = Vec::new();
        measure(
            |input: &[u64]| {
                first.push(input[0]);
                Ok::<_, String>(())
            },
            &[4],
            &config,
        )
        .unwrap();
        assert_eq!(first, vec![3]);
    }

    #[test]
    fn target_error_names_the_size() {
        let err = measure(
            |input: &[u64]| if input.len() > 2 { Err("too big") } else { Ok(()) },
            &[1, 2, 3],
            &MeasureConfig::default(),
        )
        .unwrap_err();
        match err {
            MeasureError::TargetFailed { size, message } => {
                assert_eq!(size, 3);
                assert_eq!(message, "too big");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn target_panic_is_caught() {
        let err = measure(
            |input: &[u64]| -> Result<(), String> {
                if input.len() == 2 {
                    panic!("boom at two");
                }
                Ok(())
            },
            &[1, 2],
            &MeasureConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MeasureError::TargetPanicked { size: 2, ref message } if message == "boom at two"));
    }

    #[test]
    fn invalid_sizes_are_rejected() {
        let ok = |_: &[u64]| Ok::<_, String>(());
        assert!(matches!(
            measure(ok, &[], &MeasureConfig::default()),
            Err(MeasureError::EmptySizes)
        ));
        assert!(matches!(
            measure(ok, &[3, 0], &MeasureConfig::default()),
            Err(MeasureError::InvalidSize { index: 1 })
        ));
    }

    #[test]
    fn aggregates() {
        assert_eq!(aggregate(&mut [3.0, 1.0, 2.0], Aggregate::Mean), 2.0);
        assert_eq!(aggregate(&mut [3.0, 1.0, 2.0], Aggregate::Median), 2.0);
        assert_eq!(aggregate(&mut [4.0, 1.0, 3.0, 2.0], Aggregate::Median), 2.5);
        assert_eq!(aggregate(&mut [3.0, 1.0, 2.0], Aggregate::Min), 1.0);
    }
}
