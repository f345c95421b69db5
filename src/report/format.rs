//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::{BatchReport, FunctionOutcome};
use crate::domain::{EstimationResult, FitConfig, ModelKind, SelectionCriterion};
use crate::report::compute_residuals;
use crate::targets::Module;

/// Format one function's estimate: winner, parameters, candidate table.
pub fn format_estimate(
    name: &str,
    expected: Option<ModelKind>,
    result: &EstimationResult,
    criterion: SelectionCriterion,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {name} ===\n"));
    out.push_str(&format!(
        "Sizes: {} | n=[{}, {}]\n",
        result.measurements.len(),
        result.sizes().into_iter().min().unwrap_or(0),
        result.sizes().into_iter().max().unwrap_or(0),
    ));
    out.push_str(&format!("Estimated complexity: {}\n", result.name()));
    out.push_str(&format!("- params: {}\n", fmt_vec(result.params())));
    out.push_str(&format!("- MSE   : {:.3e}\n", result.mse()));
    if let Some(expected) = expected {
        let verdict = if expected == result.model() { "match" } else { "differs" };
        out.push_str(&format!("- expected: {expected} ({verdict})\n"));
    }

    out.push_str(&format!("\nModel diagnostics (criterion: {}):\n", criterion_label(criterion)));
    for fit in &result.candidates {
        let chosen = if fit.model == result.model() { "*" } else { " " };
        out.push_str(&format!(
            "{chosen} {:<12} MSE={:.3e} BIC={:.3} iters={:<4} params={}\n",
            fit.model.display_name(),
            fit.mse,
            fit.bic,
            fit.iterations,
            fmt_vec(&fit.params),
        ));
    }
    for s in &result.skipped {
        out.push_str(&format!("  (skipped {}) {}\n", s.model, s.reason));
    }

    out
}

/// Format the per-size observed / predicted / residual table of the winner.
pub fn format_residuals(result: &EstimationResult) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>10} {:>12} {:>12} {:>12}", "n", "observed", "predicted", "residual").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<12} {:-<12} {:-<12}", "", "", "", "").trim_end());
    out.push('\n');

    for r in compute_residuals(result) {
        out.push_str(&format!(
            "{:>10} {:>12.3e} {:>12.3e} {:>12.3e}\n",
            r.size, r.observed, r.predicted, r.residual
        ));
    }
    out
}

/// Format a failed function.
pub fn format_failure(outcome: &FunctionOutcome) -> String {
    match outcome.error() {
        Some(err) => format!("=== {} ===\nerror: {err}\n", outcome.name),
        None => String::new(),
    }
}

/// Format every outcome of a batch, followed by a one-line-per-function summary.
pub fn format_batch(report: &BatchReport, config: &FitConfig, residuals: bool) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(result) => {
                out.push_str(&format_estimate(&outcome.name, outcome.expected, result, config.criterion));
                if residuals {
                    out.push('\n');
                    out.push_str(&format_residuals(result));
                }
            }
            Err(_) => out.push_str(&format_failure(outcome)),
        }
        out.push('\n');
    }

    if report.outcomes.len() > 1 {
        out.push_str(&format_summary(report));
    }
    out
}

/// One line per function: name and winner (or failure).
pub fn format_summary(report: &BatchReport) -> String {
    let mut out = String::new();
    out.push_str("Summary:\n");
    for outcome in &report.outcomes {
        let verdict = match &outcome.result {
            Ok(r) => r.name().to_string(),
            Err(e) => format!("failed ({e})"),
        };
        out.push_str(&format!("  {:<24} {verdict}\n", truncate(&outcome.name, 24)));
    }
    out
}

/// List registry modules and their functions.
pub fn format_registry(modules: &[Module]) -> String {
    let mut out = String::new();
    for m in modules {
        out.push_str(&format!("{} - {}\n", m.name, m.summary));
        for t in m.targets {
            out.push_str(&format!(
                "  {:<20} {:<10} {}\n",
                t.name,
                t.expected.display_name(),
                t.summary
            ));
        }
    }
    out
}

fn criterion_label(c: SelectionCriterion) -> &'static str {
    match c {
        SelectionCriterion::Mse => "MSE",
        SelectionCriterion::Bic => "BIC",
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6e}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
