//! End-to-end: recorded CSV -> estimates -> report, exports and plots.

use complexity_estimator::app::pipeline::estimate_batch;
use complexity_estimator::domain::{FitConfig, ModelKind, SelectionCriterion};
use complexity_estimator::io::{
    CSV_HEADER, parse_measurements, read_results_json, write_results, write_results_json,
};
use complexity_estimator::plot::render_results;
use complexity_estimator::report::format_batch;

fn recorded_csv() -> String {
    let mut csv = String::from("function,size,seconds\n");
    for n in [100usize, 200, 400, 800, 1600] {
        let x = n as f64;
        csv.push_str(&format!("scan,{n},{:e}\n", 3e-8 * x + 2e-6));
        csv.push_str(&format!("pairs,{n},{:e}\n", 5e-10 * x * x + 1e-6));
    }
    csv.push_str("scan,abc,1.0\n");
    csv
}

#[test]
fn csv_to_report() {
    let data = parse_measurements(recorded_csv().as_bytes(), "data").unwrap();
    assert_eq!(data.rows_read, 11);
    assert_eq!(data.rows_used, 10);
    assert_eq!(data.row_errors.len(), 1);
    assert_eq!(data.row_errors[0].line, 12);

    let report = estimate_batch(&data.series, &FitConfig::default());
    assert_eq!(report.exit_code(), None);
    assert_eq!(report.get("scan").unwrap().estimate().unwrap().model(), ModelKind::Linear);
    assert_eq!(report.get("pairs").unwrap().estimate().unwrap().model(), ModelKind::Quadratic);

    let text = format_batch(&report, &FitConfig::default(), true);
    assert!(text.contains("scan"));
    assert!(text.contains("O(n)"));
    assert!(text.contains("O(n^2)"));
}

#[test]
fn csv_export_has_one_row_per_measurement() {
    let data = parse_measurements(recorded_csv().as_bytes(), "data").unwrap();
    let report = estimate_batch(&data.series, &FitConfig::default());

    let mut out = Vec::new();
    write_results(&mut out, &report).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines.len(), 1 + 10);
    assert!(lines[1..].iter().all(|l| l.split(',').count() == 6));
    assert!(lines.iter().any(|l| l.starts_with("pairs,O(n^2),1600,")));
}

#[test]
fn exported_json_can_be_plotted_later() {
    let data = parse_measurements(recorded_csv().as_bytes(), "data").unwrap();
    let fit = FitConfig {
        criterion: SelectionCriterion::Bic,
        ..FitConfig::default()
    };
    let report = estimate_batch(&data.series, &fit);

    let path = std::env::temp_dir().join(format!("bigo-pipeline-{}.json", std::process::id()));
    write_results_json(&path, &report.to_results_file(&fit)).unwrap();
    let back = read_results_json(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(back.criterion, SelectionCriterion::Bic);
    assert_eq!(back.functions.len(), 2);
    let scan = back.functions.iter().find(|f| f.name == "scan").unwrap();
    let original = report.get("scan").unwrap().estimate().unwrap();
    let restored = scan.estimate.as_ref().unwrap();
    assert_eq!(restored.model(), original.model());
    assert_eq!(restored.sizes(), original.sizes());
    for (a, b) in restored.params().iter().zip(original.params()) {
        assert!((a - b).abs() <= 1e-12 * b.abs().max(1e-30));
    }

    let plot = render_results(&back, 60, 15);
    assert!(plot.contains("scan"));
    assert!(plot.contains("pairs"));
}
