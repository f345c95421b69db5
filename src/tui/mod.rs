//! Ratatui-based terminal UI.
//!
//! Browses the outcomes of one batch: a function list on the left, a chart of
//! the selected function's measurements and fitted curve on the right. Any
//! fitted candidate can be overlaid instead of the winner.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::{BatchReport, FunctionOutcome};
use crate::domain::{EstimationResult, ModelFit};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::TimingPlottersChart;

/// Curve samples drawn per chart.
const CURVE_POINTS: usize = 200;

/// Start the TUI on a finished batch.
pub fn run(report: &BatchReport) -> Result<(), AppError> {
    if report.outcomes.is_empty() {
        return Err(AppError::new(2, "Nothing to display."));
    }

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(report);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App<'a> {
    report: &'a BatchReport,
    selected: usize,
    /// Index into the selected function's candidates; `None` shows the winner.
    candidate: Option<usize>,
    status: String,
}

impl<'a> App<'a> {
    fn new(report: &'a BatchReport) -> Self {
        Self {
            report,
            selected: 0,
            candidate: None,
            status: format!("{} function(s)", report.outcomes.len()),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                if self.selected > 0 {
                    self.selected -= 1;
                    self.candidate = None;
                }
            }
            KeyCode::Down => {
                if self.selected + 1 < self.report.outcomes.len() {
                    self.selected += 1;
                    self.candidate = None;
                }
            }
            KeyCode::Char('m') => match self.outcome().estimate() {
                Some(result) => {
                    self.candidate = next_candidate(self.candidate, result.candidates.len());
                    let shown = displayed_fit(result, self.candidate);
                    self.status = format!("model: {}", shown.model);
                }
                None => self.status = "No fitted models for this function.".to_string(),
            },
            _ => {}
        }
        false
    }

    fn outcome(&self) -> &'a FunctionOutcome {
        &self.report.outcomes[self.selected]
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let outcome = self.outcome();
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("bigo", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {}", outcome.name)),
        ]));

        let detail = match &outcome.result {
            Ok(result) => {
                let shown = displayed_fit(result, self.candidate);
                format!(
                    "estimate: {} | showing: {} | mse={:.3e} | params={}",
                    result.name(),
                    shown.model,
                    shown.mse,
                    fmt_params(&shown.params),
                )
            }
            Err(e) => format!("failed: {e}"),
        };
        lines.push(Line::from(Span::styled(detail, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(0)])
            .split(area);

        self.draw_functions(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_functions(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .report
            .outcomes
            .iter()
            .map(|o| {
                let verdict = match &o.result {
                    Ok(r) => r.name().to_string(),
                    Err(_) => "failed".to_string(),
                };
                ListItem::new(format!("{} {verdict}", o.name))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Functions").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Time vs. input size").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let outcome = self.outcome();
        let Some(result) = outcome.estimate() else {
            let msg = outcome
                .error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "No data.".to_string());
            let p = Paragraph::new(msg)
                .style(Style::default().fg(Color::Red))
                .block(Block::default());
            frame.render_widget(p, inner);
            return;
        };

        let fit = displayed_fit(result, self.candidate);
        let series = chart_series(result, fit);

        let (chart_rect, insets) = chart_layout(inner);
        let widget = TimingPlottersChart {
            curve: &series.curve,
            points: &series.points,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: "n",
            y_label: "seconds",
            fmt_x: fmt_axis_x,
            fmt_y: fmt_axis_y,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, series.x_bounds, series.y_bounds);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ function  m cycle model  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Data behind one chart.
#[derive(Debug, Clone, PartialEq)]
struct ChartSeries {
    curve: Vec<(f64, f64)>,
    points: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(result: &EstimationResult, fit: &ModelFit) -> ChartSeries {
    let points = result.series();
    let curve = result.curve_for(fit, CURVE_POINTS);

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, _) in &points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
    }
    if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
        x_min = 0.0;
        x_max = x_max.max(1.0);
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in points.iter().chain(curve.iter()) {
        if y.is_finite() {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = y_max.max(1.0);
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    ChartSeries {
        curve,
        points,
        x_bounds: [x_min, x_max],
        y_bounds: [y_min - pad, y_max + pad],
    }
}

/// `None` (winner) -> 0 -> 1 -> ... -> last -> `None`.
fn next_candidate(cur: Option<usize>, count: usize) -> Option<usize> {
    match cur {
        None if count > 0 => Some(0),
        Some(i) if i + 1 < count => Some(i + 1),
        _ => None,
    }
}

fn displayed_fit(result: &EstimationResult, candidate: Option<usize>) -> &ModelFit {
    candidate
        .and_then(|i| result.candidates.get(i))
        .unwrap_or(&result.best)
}

fn fmt_params(params: &[f64]) -> String {
    let parts: Vec<String> = params.iter().map(|p| format!("{p:.3e}")).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_axis_x(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_y(v: f64) -> String {
    format!("{v:.1e}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_x(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_y(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("input size n")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("seconds")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
