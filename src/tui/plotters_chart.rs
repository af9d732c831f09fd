//! Plotters-powered diffusion chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::{ModelKind, SampleSeries};

/// Plotters line color for a model.
pub fn model_rgb(model: ModelKind) -> RGBColor {
    match model {
        ModelKind::Original => RGBColor(0, 255, 255), // cyan
        ModelKind::Perrin => RGBColor(0, 255, 0),     // green
        ModelKind::Modern => RGBColor(255, 0, 255),   // magenta
    }
}

/// Ratatui color matching `model_rgb` (used for legends).
pub fn model_color(model: ModelKind) -> Color {
    match model {
        ModelKind::Original => Color::Cyan,
        ModelKind::Perrin => Color::Green,
        ModelKind::Modern => Color::Magenta,
    }
}

/// Split a series into runs of finite points so gaps are not bridged by a line.
pub fn finite_runs(points: &[(f64, f64)]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for &(x, y) in points {
        if x.is_finite() && y.is_finite() {
            current.push((x, y));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct DiffusionChart<'a> {
    /// One line per model.
    pub series: &'a [SampleSeries],
    /// Current-shape marker per model.
    pub markers: &'a [(ModelKind, (f64, f64))],
    /// X bounds (nm).
    pub x_bounds: [f64; 2],
    /// Y bounds (m²/s).
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for DiffusionChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for s in self.series {
                let color = model_rgb(s.model);
                for run in finite_runs(&s.points) {
                    chart.draw_series(LineSeries::new(run, &color))?;
                }
            }

            // `Circle` radii are mis-scaled by the terminal backend; a pixel
            // reliably marks the current shape.
            chart.draw_series(
                self.markers
                    .iter()
                    .filter(|(_, (x, y))| x.is_finite() && y.is_finite())
                    .map(|&(_, p)| Pixel::new(p, WHITE)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
