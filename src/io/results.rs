//! Read/write results JSON files.
//!
//! A results file is the portable record of one run:
//! - tool name/version and timestamp
//! - the selection criterion used
//! - per function: the full estimate (measurements, every candidate fit,
//!   excluded models) or the error that stopped it
//!
//! `bigo plot` re-renders plots from it without re-measuring.

use std::fs::File;
use std::path::Path;

use crate::domain::ResultsFile;
use crate::error::AppError;

/// Write a results JSON file.
pub fn write_results_json(path: &Path, results: &ResultsFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create results JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, results)
        .map_err(|e| AppError::new(2, format!("Failed to write results JSON: {e}")))?;

    Ok(())
}

/// Read a results JSON file.
pub fn read_results_json(path: &Path) -> Result<ResultsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open results JSON '{}': {e}", path.display())))?;
    let results: ResultsFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid results JSON: {e}")))?;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::estimate_batch;
    use crate::domain::{FitConfig, Measurement, ModelKind};

    #[test]
    fn results_file_survives_disk() {
        let series = vec![(
            "lin".to_string(),
            vec![Measurement::new(10, 1e-6), Measurement::new(20, 2e-6), Measurement::new(40, 4e-6)],
        )];
        let report = estimate_batch(&series, &FitConfig::default());
        let file = report.to_results_file(&FitConfig::default());

        let path = std::env::temp_dir().join(format!("bigo-results-{}.json", std::process::id()));
        write_results_json(&path, &file).unwrap();
        let back = read_results_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.functions.len(), 1);
        let estimate = back.functions[0].estimate.as_ref().unwrap();
        assert_eq!(estimate.model(), ModelKind::Linear);
        assert_eq!(estimate.measurements, series[0].1);
    }

    #[test]
    fn invalid_json_is_a_usage_error() {
        let path = std::env::temp_dir().join(format!("bigo-invalid-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_results_json(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert_eq!(err.exit_code(), 2);
    }
}
