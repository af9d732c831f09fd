//! Ratatui-based terminal UI.
//!
//! Two tabs:
//! - *Solve*: pick model, direction, known axis, target D and sigmas; the solved
//!   axis and its uncertainty update on every change
//! - *Compare*: D vs b for all three models at a fixed a, plus the percentage
//!   differences at the current shape

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
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs},
};

use crate::cli::TuiArgs;
use crate::compare::ModelComparison;
use crate::domain::{
    Axis, ModelKind, PhysicalConstants, SampleSeries, SolveConfig, SolveResult, Spacing, SweepConfig,
    SweepSpec, SweepVariable, UncertaintyInputs,
};
use crate::error::AppError;
use crate::models::evaluate;

mod plotters_chart;

use plotters_chart::{DiffusionChart, model_color};

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    let mut app = App::new(&args)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Solve,
    Compare,
}

impl Tab {
    fn index(self) -> usize {
        match self {
            Tab::Solve => 0,
            Tab::Compare => 1,
        }
    }

    fn toggle(self) -> Self {
        match self {
            Tab::Solve => Tab::Compare,
            Tab::Compare => Tab::Solve,
        }
    }
}

const SOLVE_FIELDS: usize = 6;
const COMPARE_FIELDS: usize = 2;

/// Number of points on the compare chart.
const CHART_POINTS: usize = 150;

struct App {
    constants: PhysicalConstants,
    tab: Tab,
    selected: usize,
    /// Text buffer while a numeric field is being typed.
    editing: Option<String>,
    status: String,

    // Solve tab.
    model: ModelKind,
    solve_for: Axis,
    known: f64,
    target_d: f64,
    sigma_d: f64,
    sigma_known: f64,
    solved: Option<Result<SolveResult, String>>,

    // Compare tab.
    a: f64,
    b: f64,
    comparison: Option<ModelComparison>,
    series: Vec<SampleSeries>,
}

impl App {
    fn new(args: &TuiArgs) -> Result<Self, AppError> {
        let constants = crate::app::constants_from_args(&args.constants)?;
        // Seed the target with the forward value of the starting shape.
        let target_d = evaluate(&constants, args.model, args.a, args.b)?;

        let mut app = Self {
            constants,
            tab: Tab::Solve,
            selected: 0,
            editing: None,
            status: "Ready.".to_string(),
            model: args.model,
            solve_for: Axis::B,
            known: args.a,
            target_d,
            sigma_d: 0.01 * target_d,
            sigma_known: 0.0,
            solved: None,
            a: args.a,
            b: args.b,
            comparison: None,
            series: Vec::new(),
        };
        app.recompute_solve();
        app.recompute_compare();
        Ok(app)
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

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing.is_some() {
            self.handle_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => {
                self.tab = self.tab.toggle();
                self.selected = 0;
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected + 1 < self.field_count() {
                    self.selected += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => {
                if let Some(v) = self.field_value() {
                    self.editing = Some(format!("{v}"));
                    self.status = "Editing value. Enter to apply, Esc to cancel.".to_string();
                }
            }
            _ => {}
        }
        false
    }

    fn handle_edit(&mut self, code: KeyCode) {
        let Some(buf) = self.editing.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let text = buf.trim().to_string();
                self.editing = None;
                match text.parse::<f64>() {
                    Ok(v) => {
                        self.set_field_value(v);
                        self.recompute();
                    }
                    Err(e) => self.status = format!("Invalid number '{text}': {e}"),
                }
            }
            KeyCode::Backspace => {
                buf.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+') {
                    buf.push(c);
                }
            }
            _ => {}
        }
    }

    fn field_count(&self) -> usize {
        match self.tab {
            Tab::Solve => SOLVE_FIELDS,
            Tab::Compare => COMPARE_FIELDS,
        }
    }

    /// Current value of the selected numeric field (`None` for enum fields).
    fn field_value(&self) -> Option<f64> {
        match (self.tab, self.selected) {
            (Tab::Solve, 2) => Some(self.known),
            (Tab::Solve, 3) => Some(self.target_d),
            (Tab::Solve, 4) => Some(self.sigma_d),
            (Tab::Solve, 5) => Some(self.sigma_known),
            (Tab::Compare, 0) => Some(self.a),
            (Tab::Compare, 1) => Some(self.b),
            _ => None,
        }
    }

    fn set_field_value(&mut self, v: f64) {
        match (self.tab, self.selected) {
            (Tab::Solve, 2) => self.known = v,
            (Tab::Solve, 3) => self.target_d = v,
            (Tab::Solve, 4) => self.sigma_d = v,
            (Tab::Solve, 5) => self.sigma_known = v,
            (Tab::Compare, 0) => self.a = v,
            (Tab::Compare, 1) => self.b = v,
            _ => {}
        }
    }

    fn adjust_field(&mut self, delta: i32) {
        let up = delta >= 0;
        match (self.tab, self.selected) {
            (Tab::Solve, 0) => {
                self.model = if up { self.model.next() } else { self.model.prev() };
            }
            (Tab::Solve, 1) => {
                self.solve_for = self.solve_for.other();
            }
            (Tab::Solve, 2) => self.known = step_length(self.known, up),
            (Tab::Solve, 3) => {
                self.target_d = if up { self.target_d * 1.05 } else { self.target_d / 1.05 };
            }
            (Tab::Solve, 4) => {
                let step = 0.005 * self.target_d.abs();
                self.sigma_d = if up { self.sigma_d + step } else { (self.sigma_d - step).max(0.0) };
            }
            (Tab::Solve, 5) => {
                self.sigma_known = if up {
                    self.sigma_known + 0.05
                } else {
                    (self.sigma_known - 0.05).max(0.0)
                };
            }
            (Tab::Compare, 0) => self.a = step_length(self.a, up),
            (Tab::Compare, 1) => self.b = step_length(self.b, up),
            _ => return,
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        match self.tab {
            Tab::Solve => self.recompute_solve(),
            Tab::Compare => self.recompute_compare(),
        }
    }

    fn recompute_solve(&mut self) {
        let uncertainty = match UncertaintyInputs::new(self.sigma_d, self.sigma_known) {
            Ok(u) => Some(u),
            Err(err) => {
                self.solved = Some(Err(err.to_string()));
                self.status = "Invalid uncertainty inputs.".to_string();
                return;
            }
        };
        let config = SolveConfig {
            constants: self.constants,
            model: self.model,
            solve_for: self.solve_for,
            known_value: self.known,
            target_d: self.target_d,
            initial_guess: None,
            max_iter: 200,
            uncertainty,
            export_json: None,
        };
        match crate::app::pipeline::run_solve(&config) {
            Ok(res) => {
                self.status = format!(
                    "{}: {} = {:.4} nm",
                    res.model.display_name(),
                    res.solve_for.symbol(),
                    res.optimized_value
                );
                self.solved = Some(Ok(res));
            }
            Err(err) => {
                self.status = "Solve failed.".to_string();
                self.solved = Some(Err(err.to_string()));
            }
        }
    }

    fn recompute_compare(&mut self) {
        match crate::app::pipeline::run_compare(&self.constants, self.a, self.b) {
            Ok(cmp) => self.comparison = Some(cmp),
            Err(err) => {
                self.comparison = None;
                self.series.clear();
                self.status = err.to_string();
                return;
            }
        }

        let config = SweepConfig {
            constants: self.constants,
            models: ModelKind::ALL.to_vec(),
            fixed_axis: Axis::A,
            fixed_value: self.a,
            sweep: chart_sweep(self.a, self.b),
            plot: false,
            plot_width: 0,
            plot_height: 0,
            export_csv: None,
        };
        match crate::app::pipeline::run_sweep(&config) {
            Ok(out) => {
                self.series = out.series;
                self.status = format!("Compare at a={:.3} nm, b={:.3} nm", self.a, self.b);
            }
            Err(err) => {
                self.series.clear();
                self.status = err.to_string();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match self.tab {
            Tab::Solve => self.draw_solve(frame, chunks[1]),
            Tab::Compare => self.draw_compare(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(Line::from(vec![
            Span::styled("ediff", Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                " | T={:.2} K | eta={:.5} Pa·s",
                self.constants.temperature_k(),
                self.constants.viscosity_pa_s()
            )),
        ]));
        let tabs = Tabs::new(vec!["Solve", "Compare"])
            .select(self.tab.index())
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn settings_list(&self, title: &str, items: Vec<String>, area: Rect, frame: &mut ratatui::Frame<'_>) {
        let items: Vec<ListItem> = items.into_iter().map(ListItem::new).collect();
        let list = List::new(items)
            .block(Block::default().title(title.to_string()).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);

        if let Some(buf) = &self.editing {
            let hint = Paragraph::new(format!("> {buf}"))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_solve(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(40), Constraint::Min(0)])
            .split(area);

        let known = self.solve_for.other();
        let items = vec![
            format!("Model: {}", self.model.display_name()),
            format!("Solve for: {}", self.solve_for.display_name()),
            format!("Known {}: {:.4} nm", known.symbol(), self.known),
            format!("Target D: {} m^2/s", crate::report::fmt_d(self.target_d)),
            format!("sigma_D: {} m^2/s", crate::report::fmt_d(self.sigma_d)),
            format!("sigma_{}: {:.3} nm", known.symbol(), self.sigma_known),
        ];
        self.settings_list("Inputs", items, chunks[0], frame);

        let block = Block::default().title("Result").borders(Borders::ALL);
        let body = match &self.solved {
            Some(Ok(res)) => Paragraph::new(crate::report::format_solve_result(res, &self.constants)),
            Some(Err(msg)) => Paragraph::new(msg.as_str()).style(Style::default().fg(Color::Red)),
            None => Paragraph::new("No result yet.").style(Style::default().fg(Color::Yellow)),
        };
        frame.render_widget(body.block(block), chunks[1]);
    }

    fn draw_compare(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(9)])
            .split(area);

        self.draw_chart(frame, chunks[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(0)])
            .split(chunks[1]);
        let items = vec![format!("a: {:.4} nm", self.a), format!("b: {:.4} nm", self.b)];
        self.settings_list("Shape", items, bottom[0], frame);

        let text = self
            .comparison
            .as_ref()
            .map(crate::report::format_comparison)
            .unwrap_or_else(|| "-".to_string());
        let p = Paragraph::new(text).block(Block::default().title("Models").borders(Borders::ALL));
        frame.render_widget(p, bottom[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut title = vec![Span::raw(format!("D vs b at a={:.3} nm  ", self.a))];
        for s in &self.series {
            title.push(Span::styled(
                format!("{} ", s.model.display_name()),
                Style::default().fg(model_color(s.model)),
            ));
        }
        let block = Block::default().title(Line::from(title)).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some((x_bounds, y_bounds)) = chart_bounds(&self.series) else {
            let msg = Paragraph::new("No finite samples to plot.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let markers: Vec<(ModelKind, (f64, f64))> = self
            .comparison
            .iter()
            .flat_map(|c| c.values.iter().map(|(&m, &d)| (m, (c.b, d))))
            .collect();

        let (chart_rect, insets) = chart_layout(inner);
        let widget = DiffusionChart {
            series: &self.series,
            markers: &markers,
            x_bounds,
            y_bounds,
            x_label: "b (nm)",
            y_label: "D (m^2/s)",
            fmt_x: fmt_axis_x,
            fmt_y: fmt_axis_y,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab switch  ↑/↓ select  ←/→ adjust  Enter type value  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Step a length by ±0.5 nm, never below 0.1 nm.
fn step_length(v: f64, up: bool) -> f64 {
    if up { v + 0.5 } else { (v - 0.5).max(0.1) }
}

/// b range for the compare chart: oblate through prolate, always covering the current b.
fn chart_sweep(a: f64, b: f64) -> SweepSpec {
    let start = 0.2 * a;
    let end = (10.0 * a).max(1.2 * b);
    SweepSpec {
        variable: SweepVariable::Axis,
        start,
        end,
        steps: CHART_POINTS,
        spacing: Spacing::Linear,
    }
}

/// X/Y bounds over every finite point, with 5% vertical padding.
fn chart_bounds(series: &[SampleSeries]) -> Option<([f64; 2], [f64; 2])> {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in series.iter().flat_map(|s| s.points.iter()) {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !(x_min.is_finite() && x_max.is_finite()) || x_max <= x_min {
        return None;
    }
    if !(y_min.is_finite() && y_max.is_finite()) {
        return None;
    }
    if y_max <= y_min {
        let half = (y_min.abs() * 0.5).max(1e-30);
        y_min -= half;
        y_max += half;
    }

    let pad = (y_max - y_min).abs() * 0.05;
    Some(([x_min, x_max], [y_min - pad, y_max + pad]))
}

fn fmt_axis_x(v: f64) -> String {
    format!("{v:.1}")
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

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
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
        let start = x.saturating_sub(label_len / 2);
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
        let start = x.saturating_sub(label_len);
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

    let x_label = Paragraph::new("b (nm)")
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

    let y_label = Paragraph::new(Text::from("D (m^2/s)"))
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
