//! Chart data shared by the ASCII plot and the TUI chart.
//!
//! Two views of the same fit:
//!
//! - `Time`: observed values (points) and fitted values (line) against year
//! - `Fit`: fitted (y) against observed (x), with a 45° reference line

use chrono::{Datelike, NaiveDate};

use crate::report::ObservationRow;

pub mod ascii;

pub use ascii::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartView {
    Time,
    Fit,
}

impl ChartView {
    pub fn toggle(self) -> Self {
        match self {
            Self::Time => Self::Fit,
            Self::Fit => Self::Time,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Time => "Observed vs fitted over time",
            Self::Fit => "Fitted vs observed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartSeries {
    /// Scatter series.
    pub points: Vec<(f64, f64)>,
    /// Line series.
    pub line: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: String,
    pub y_label: String,
}

/// Fractional year, e.g. 2014-07-02 -> ~2014.5.
pub fn year_fraction(date: NaiveDate) -> f64 {
    date.year() as f64 + date.ordinal0() as f64 / 365.25
}

pub fn chart_series(rows: &[ObservationRow], view: ChartView, target_name: &str) -> ChartSeries {
    match view {
        ChartView::Time => {
            let points: Vec<(f64, f64)> = rows
                .iter()
                .map(|r| (year_fraction(r.date), r.observed))
                .collect();
            let line: Vec<(f64, f64)> = rows
                .iter()
                .map(|r| (year_fraction(r.date), r.fitted))
                .collect();
            let x_bounds = bounds(points.iter().map(|p| p.0), 0.02);
            let y_bounds = bounds(points.iter().chain(&line).map(|p| p.1), 0.05);
            ChartSeries {
                points,
                line,
                x_bounds,
                y_bounds,
                x_label: "year".to_string(),
                y_label: target_name.to_string(),
            }
        }
        ChartView::Fit => {
            let points: Vec<(f64, f64)> = rows.iter().map(|r| (r.observed, r.fitted)).collect();
            let both = bounds(points.iter().flat_map(|&(x, y)| [x, y]), 0.05);
            let line = vec![(both[0], both[0]), (both[1], both[1])];
            ChartSeries {
                points,
                line,
                x_bounds: both,
                y_bounds: both,
                x_label: format!("observed {target_name}"),
                y_label: "fitted".to_string(),
            }
        }
    }
}

fn bounds(values: impl Iterator<Item = f64>, pad_frac: f64) -> [f64; 2] {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if hi <= lo {
        return [lo - 0.5, hi + 0.5];
    }
    let pad = ((hi - lo) * pad_frac).max(1e-12);
    [lo - pad, hi + pad]
}
