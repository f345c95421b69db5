//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - fitted curve: `-` line
//! - comparison plots: one glyph per function, joined by `.`

use crate::domain::{EstimationResult, Measurement, ModelFit, ResultsFile};

/// Glyphs assigned to functions in comparison plots, in order.
const SERIES_GLYPHS: &[char] = &['*', '+', 'x', '#', '@', '%', '&', '=', '$', '~'];

/// Render one function's measurements with a fitted curve.
///
/// `fit` defaults to the winning model.
pub fn render_estimate_plot(
    result: &EstimationResult,
    fit: Option<&ModelFit>,
    width: usize,
    height: usize,
) -> String {
    let fit = fit.unwrap_or(&result.best);
    let points = result.series();
    let curve = result.curve_for(fit, width.max(2));
    let (x_min, x_max) = x_range(&points).unwrap_or((1.0, 2.0));
    render_plot(&points, Some(&curve), x_min, x_max, width, height)
}

/// Render the raw series of several functions on shared axes, with a legend.
pub fn render_comparison_plot(series: &[(&str, &[Measurement])], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all: Vec<(f64, f64)> = series
        .iter()
        .flat_map(|(_, ms)| ms.iter().map(|m| (m.size as f64, m.seconds)))
        .collect();
    let (x_min, x_max) = x_range(&all).unwrap_or((1.0, 2.0));
    let (y_min, y_max) = y_range(&all, None).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Connectors first so that every glyph stays visible.
    for (_, ms) in series {
        let pts: Vec<(f64, f64)> = ms.iter().map(|m| (m.size as f64, m.seconds)).collect();
        draw_curve(&mut grid, &pts, x_min, x_max, y_min, y_max, '.');
    }
    for (i, (_, ms)) in series.iter().enumerate() {
        let glyph = glyph(i);
        for m in ms.iter() {
            let x = map_x(m.size as f64, x_min, x_max, width);
            let y = map_y(m.seconds, y_min, y_max, height);
            grid[y][x] = glyph;
        }
    }

    let mut out = header(x_min, x_max, y_min, y_max);
    push_grid(&mut out, grid);
    for (i, (name, _)) in series.iter().enumerate() {
        out.push_str(&format!("  {} {name}\n", glyph(i)));
    }
    out
}

/// Render every estimate in a saved results file, then a comparison plot.
pub fn render_results(file: &ResultsFile, width: usize, height: usize) -> String {
    let mut out = String::new();
    for f in &file.functions {
        match (&f.estimate, &f.error) {
            (Some(result), _) => {
                out.push_str(&format!("{} ({})\n", f.name, result.name()));
                out.push_str(&render_estimate_plot(result, None, width, height));
            }
            (None, Some(err)) => out.push_str(&format!("{}: no estimate ({err})\n", f.name)),
            (None, None) => out.push_str(&format!("{}: no estimate\n", f.name)),
        }
        out.push('\n');
    }

    let series: Vec<(&str, &[Measurement])> = file
        .functions
        .iter()
        .filter_map(|f| f.estimate.as_ref().map(|r| (f.name.as_str(), r.measurements.as_slice())))
        .collect();
    if series.len() > 1 {
        out.push_str("Comparison:\n");
        out.push_str(&render_comparison_plot(&series, width, height));
    }
    out
}

fn glyph(i: usize) -> char {
    SERIES_GLYPHS[i % SERIES_GLYPHS.len()]
}

fn render_plot(
    points: &[(f64, f64)],
    curve_points: Option<&[(f64, f64)]>,
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    // Determine y-range from observed points and curve points.
    let (y_min, y_max) = y_range(points, curve_points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curve first (so points can overlay).
    if let Some(curve) = curve_points {
        draw_curve(&mut grid, curve, x_min, x_max, y_min, y_max, '-');
    }

    for &(n, t) in points {
        let x = map_x(n, x_min, x_max, width);
        let y = map_y(t, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = header(x_min, x_max, y_min, y_max);
    push_grid(&mut out, grid);
    out
}

fn header(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> String {
    format!("Plot: n=[{x_min}, {x_max}] | t=[{y_min:.3e}, {y_max:.3e}]s\n")
}

fn push_grid(out: &mut String, grid: Vec<Vec<char>>) {
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
}

fn x_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &(x, _) in points {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_range(points: &[(f64, f64)], curve: Option<&[(f64, f64)]>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    let curve = curve.unwrap_or(&[]);
    for &(_, y) in points.iter().chain(curve) {
        if y.is_finite() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        // Overflowed predictions (2^n) break the line instead of pinning it to the border.
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let xx = map_x(x, x_min, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, xx, yy, ch);
        } else if grid[yy][xx] == ' ' {
            grid[yy][xx] = ch;
        }
        prev = Some((xx, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;

    fn linear_result() -> EstimationResult {
        let fit = ModelFit {
            model: ModelKind::Linear,
            params: vec![1.0, 0.0],
            sse: 0.0,
            mse: 0.0,
            bic: 0.0,
            iterations: 1,
        };
        EstimationResult {
            best: fit.clone(),
            candidates: vec![fit],
            skipped: vec![],
            measurements: vec![Measurement::new(1, 1.0), Measurement::new(10, 10.0)],
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let txt = render_estimate_plot(&linear_result(), None, 10, 5);
        let expected = concat!(
            "Plot: n=[1, 10] | t=[5.500e-1, 1.045e1]s\n",
            "         o\n",
            "      --- \n",
            "    --    \n",
            " ---      \n",
            "o         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn comparison_plot_has_glyphs_and_legend() {
        let a = vec![Measurement::new(1, 1.0), Measurement::new(10, 2.0)];
        let b = vec![Measurement::new(1, 1.0), Measurement::new(10, 9.0)];
        let txt = render_comparison_plot(&[("flat", a.as_slice()), ("steep", b.as_slice())], 20, 8);

        assert!(txt.contains("  * flat\n"));
        assert!(txt.contains("  + steep\n"));
        // Header + 8 rows + 2 legend lines.
        assert_eq!(txt.lines().count(), 11);
        assert_eq!(txt.lines().nth(1).unwrap().chars().last(), Some('+'));
    }

    #[test]
    fn non_finite_curve_points_are_skipped() {
        let mut grid = vec![vec![' '; 10]; 5];
        draw_curve(
            &mut grid,
            &[(1.0, 1.0), (2.0, f64::INFINITY), (3.0, 2.0)],
            1.0,
            3.0,
            0.0,
            3.0,
            '-',
        );
        let drawn = grid.iter().flatten().filter(|&&c| c == '-').count();
        assert_eq!(drawn, 2);
    }
}
