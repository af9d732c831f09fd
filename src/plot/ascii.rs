//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual comparison of the three models in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Each model draws its own glyph (`o` Original, `p` Perrin, `m` Modern).
//! Non-finite samples break the line instead of being drawn.

use crate::domain::{ModelKind, SampleSeries};

/// Glyph used for a model's series.
pub fn glyph(model: ModelKind) -> char {
    match model {
        ModelKind::Original => 'o',
        ModelKind::Perrin => 'p',
        ModelKind::Modern => 'm',
    }
}

/// Render `series` on a `width × height` character grid.
pub fn render_ascii_series(series: &[SampleSeries], width: usize, height: usize, x_label: &str) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((x_min, x_max)) = x_range(series) else {
        return "Plot: no finite samples\n".to_string();
    };
    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for s in series {
        draw_series(&mut grid, &s.points, glyph(s.model), x_min, x_max, y_min, y_max);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {x_label}=[{x_min:.3}, {x_max:.3}] | D=[{y_min:.3e}, {y_max:.3e}] m^2/s\n"
    ));
    let legend: Vec<String> = series
        .iter()
        .map(|s| format!("{}={}", glyph(s.model), s.model.display_name()))
        .collect();
    out.push_str(&format!("Legend: {}\n", legend.join(" ")));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn finite_points(series: &[SampleSeries]) -> impl Iterator<Item = (f64, f64)> + '_ {
    series
        .iter()
        .flat_map(|s| s.points.iter().copied())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
}

fn x_range(series: &[SampleSeries]) -> Option<(f64, f64)> {
    let (min_x, max_x) = finite_points(series)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| (lo.min(x), hi.max(x)));
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_range(series: &[SampleSeries]) -> Option<(f64, f64)> {
    let (min_y, max_y) = finite_points(series)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, y)| (lo.min(y), hi.max(y)));
    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        // Flat series: open a window around the single level.
        let half = (min_y.abs() * 0.5).max(1e-30);
        Some((min_y - half, max_y + half))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(f64::MIN_POSITIVE);
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

fn draw_series(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    ch: char,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in points {
        if !(x.is_finite() && y.is_finite()) {
            prev = None;
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, ch),
            None => {
                if grid[row][col] == ' ' {
                    grid[row][col] = ch;
                }
            }
        }
        prev = Some((col, row));
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

    #[test]
    fn plot_golden_snapshot_small() {
        let series = vec![
            SampleSeries {
                model: ModelKind::Original,
                points: vec![(0.0, 0.0), (9.0, 9.0)],
            },
            SampleSeries {
                model: ModelKind::Modern,
                points: vec![(0.0, f64::NAN), (9.0, 0.0)],
            },
        ];

        let txt = render_ascii_series(&series, 10, 5, "b (nm)");
        let expected = concat!(
            "Plot: b (nm)=[0.000, 9.000] | D=[-4.500e-1, 9.450e0] m^2/s\n",
            "Legend: o=Original m=Modern\n",
            "        oo\n",
            "      oo  \n",
            "    oo    \n",
            "  oo      \n",
            "oo       m\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn all_nan_series_reports_no_samples() {
        let series = vec![SampleSeries {
            model: ModelKind::Perrin,
            points: vec![(1.0, f64::NAN), (2.0, f64::NAN)],
        }];
        assert_eq!(render_ascii_series(&series, 20, 8, "p"), "Plot: no finite samples\n");
    }

    #[test]
    fn flat_series_still_renders() {
        let series = vec![SampleSeries {
            model: ModelKind::Perrin,
            points: vec![(1.0, 3e-11), (2.0, 3e-11)],
        }];
        let txt = render_ascii_series(&series, 12, 5, "p");
        assert!(txt.lines().skip(2).any(|l| l.contains('p')));
    }
}
