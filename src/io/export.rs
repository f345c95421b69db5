//! Export per-size results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! one row per function and measured size, with the winning model's prediction.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::app::pipeline::BatchReport;
use crate::error::AppError;
use crate::report::compute_residuals;

pub const CSV_HEADER: &str = "function,model,size,seconds,predicted,residual";

/// Write per-size results of every successful estimate to a CSV file.
pub fn write_results_csv(path: &Path, report: &BatchReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(file, report)
}

/// Write the CSV rows to any writer.
pub fn write_results<W: Write>(mut out: W, report: &BatchReport) -> Result<(), AppError> {
    writeln!(out, "{CSV_HEADER}")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (name, result) in report.estimates() {
        for r in compute_residuals(result) {
            writeln!(
                out,
                "{},{},{},{:e},{:e},{:e}",
                csv_field(name),
                result.name(),
                r.size,
                r.observed,
                r.predicted,
                r.residual,
            )
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    Ok(())
}

/// Quote a field if it would otherwise break the row.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
