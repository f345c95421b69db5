//! CSV ingest of recorded measurements.
//!
//! Turns a CSV of timings into per-function measurement series that are safe
//! to estimate.
//!
//! Schema (header names are case-insensitive):
//! - `size` (alias `n`): positive integer input size
//! - `seconds` (aliases `time`, `t`): non-negative elapsed time
//! - `function` (optional): series name; rows without it belong to one default series
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Order preserving**: series appear in first-seen order, rows keep file order

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::Measurement;
use crate::error::AppError;

const SIZE_COLUMNS: &[&str] = &["size", "n"];
const SECONDS_COLUMNS: &[&str] = &["seconds", "time", "t"];
const FUNCTION_COLUMN: &str = "function";

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: per-function series + row errors.
#[derive(Debug, Clone)]
pub struct IngestedMeasurements {
    pub series: Vec<(String, Vec<Measurement>)>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load measurements from a CSV file.
///
/// Rows without a `function` value are named after the file stem.
pub fn load_measurements(path: &Path) -> Result<IngestedMeasurements, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let default_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    parse_measurements(file, &default_name)
}

/// Parse measurements from any CSV reader.
pub fn parse_measurements<R: Read>(input: R, default_name: &str) -> Result<IngestedMeasurements, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let size_idx = find_column(&header_map, SIZE_COLUMNS)?;
    let seconds_idx = find_column(&header_map, SECONDS_COLUMNS)?;
    let function_idx = header_map.get(FUNCTION_COLUMN).copied();

    let mut series: Vec<(String, Vec<Measurement>)> = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_used = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, size_idx, seconds_idx) {
            Ok(m) => {
                let name = function_idx
                    .and_then(|i| record.get(i))
                    .filter(|s| !s.is_empty())
                    .unwrap_or(default_name);
                match series.iter_mut().find(|(n, _)| n == name) {
                    Some((_, ms)) => ms.push(m),
                    None => series.push((name.to_string(), vec![m])),
                }
                rows_used += 1;
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for e in &row_errors {
        tracing::warn!(line = e.line, "skipped row: {}", e.message);
    }

    if rows_used == 0 {
        return Err(AppError::new(3, "No valid measurement rows in CSV."));
    }

    Ok(IngestedMeasurements {
        series,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Result<usize, AppError> {
    names
        .iter()
        .find_map(|n| header_map.get(*n).copied())
        .ok_or_else(|| AppError::new(2, format!("Missing required CSV column '{}'.", names[0])))
}

fn parse_row(record: &StringRecord, size_idx: usize, seconds_idx: usize) -> Result<Measurement, String> {
    let raw_size = record.get(size_idx).unwrap_or("");
    let size: usize = raw_size
        .parse()
        .map_err(|_| format!("invalid size '{raw_size}'"))?;
    if size == 0 {
        return Err("size must be positive".to_string());
    }

    let raw_seconds = record.get(seconds_idx).unwrap_or("");
    let seconds: f64 = raw_seconds
        .parse()
        .map_err(|_| format!("invalid seconds '{raw_seconds}'"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!("seconds must be finite and non-negative (got {raw_seconds})"));
    }

    Ok(Measurement::new(size, seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_function_in_first_seen_order() {
        let csv = "\u{feff}Function,Size,Seconds\nb,10,0.1\na,10,0.2\nb,20,0.3\n";
        let data = parse_measurements(csv.as_bytes(), "default").unwrap();

        let names: Vec<&str> = data.series.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(
            data.series[0].1,
            vec![Measurement::new(10, 0.1), Measurement::new(20, 0.3)]
        );
        assert_eq!(data.rows_used, 3);
    }

    #[test]
    fn bad_rows_are_reported_with_line_numbers() {
        let csv = "n,time\n10,0.1\n0,0.2\nabc,0.3\n40,-1\n50,0.5\n";
        let data = parse_measurements(csv.as_bytes(), "series").unwrap();

        assert_eq!(data.series.len(), 1);
        assert_eq!(data.series[0].0, "series");
        assert_eq!(data.series[0].1.len(), 2);
        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert_eq!(data.rows_read, 5);
    }

    #[test]
    fn missing_column_is_a_usage_error() {
        let err = parse_measurements("size,value\n1,2\n".as_bytes(), "x").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("seconds"));
    }

    #[test]
    fn no_valid_rows_is_insufficient_data() {
        let err = parse_measurements("size,seconds\n0,1\n".as_bytes(), "x").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
