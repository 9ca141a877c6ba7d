//! Fixed-grid ASCII chart for `gd report`.
//!
//! Output is deterministic for a given table and size.
//!
//! Plot elements:
//! - moving average: `-` line, drawn first
//! - price: `*` line, drawn over the average

use chrono::NaiveDate;

use crate::align::AlignedTable;
use crate::domain::Field;

/// Plot the anchor price against its moving average over the table's rows.
pub fn render_price_plot(table: &AlignedTable, width: usize, height: usize) -> String {
    let price: Vec<Option<f64>> = table.anchor_values().into_iter().map(Some).collect();
    let ma = table.derived(Field::MovingAverage).map(<[_]>::to_vec).unwrap_or_default();
    render_series(table.dates(), &[(ma.as_slice(), '-'), (price.as_slice(), '*')], width, height)
}

/// Render several aligned series on one grid. Later series overdraw earlier ones.
pub fn render_series(dates: &[NaiveDate], series: &[(&[Option<f64>], char)], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let n = dates.len();
    for &(values, ch) in series {
        draw_series(&mut grid, values, n, y_min, y_max, ch);
    }

    let mut out = String::new();
    match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => {
            out.push_str(&format!("Plot: {first} .. {last} | y=[{y_min:.2}, {y_max:.2}]\n"));
        }
        _ => out.push_str("Plot: no rows\n"),
    }

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    out
}

fn y_range(series: &[(&[Option<f64>], char)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for (values, _) in series {
        for v in values.iter().flatten().filter(|v| v.is_finite()) {
            min_y = min_y.min(*v);
            max_y = max_y.max(*v);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        Some((min_y - 1.0, min_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let u = i as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Gaps (`None`) break the line.
fn draw_series(grid: &mut [Vec<char>], values: &[Option<f64>], n: usize, y_min: f64, y_max: f64, ch: char) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for (i, v) in values.iter().enumerate() {
        let Some(v) = v.filter(|v| v.is_finite()) else {
            prev = None;
            continue;
        };
        let x = map_x(i, n, width);
        let y = map_y(v, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, y, ch),
            None => grid[y][x] = ch,
        }
        prev = Some((x, y));
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
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
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

    fn dates(n: u32) -> Vec<NaiveDate> {
        (1..=n).map(|d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap()).collect()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let price = [Some(100.0), Some(110.0)];
        let txt = render_series(&dates(2), &[(&price[..], '*')], 10, 5);
        let expected = concat!(
            "Plot: 2025-01-01 .. 2025-01-02 | y=[99.50, 110.50]\n",
            "        **\n",
            "      **\n",
            "    **\n",
            "  **\n",
            "**\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn gaps_break_the_line() {
        let ma = [None, None, Some(5.0), Some(5.0)];
        let txt = render_series(&dates(4), &[(&ma[..], '-')], 10, 5);
        let body: String = txt.lines().skip(1).collect();
        // Only the warm segment is drawn: columns 6..=9.
        assert_eq!(body.chars().filter(|c| *c == '-').count(), 4);
    }

    #[test]
    fn empty_input_does_not_panic() {
        let txt = render_series(&[], &[], 10, 5);
        assert!(txt.starts_with("Plot: no rows"));
    }
}
