//! Annual resampling and table alignment.
//!
//! Resampling keeps the first observation of each calendar year and labels it
//! with January 1 of that year. Alignment is driven by the target's annual
//! index: a year is kept only when every factor has a value for it.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::domain::AlignedTable;

/// Reduce observations to one point per calendar year (first observation).
pub fn resample_annual_first(obs: &[(NaiveDate, f64)]) -> Vec<(NaiveDate, f64)> {
    let mut by_year: BTreeMap<i32, (NaiveDate, f64)> = BTreeMap::new();
    for &(date, value) in obs {
        by_year
            .entry(date.year())
            .and_modify(|first| {
                if date < first.0 {
                    *first = (date, value);
                }
            })
            .or_insert((date, value));
    }

    by_year
        .into_iter()
        .filter_map(|(year, (_, value))| Some((NaiveDate::from_ymd_opt(year, 1, 1)?, value)))
        .collect()
}

/// Years dropped during alignment, with the factor columns that were missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentGap {
    pub date: NaiveDate,
    pub missing: Vec<String>,
}

/// Build the target-first annual table.
///
/// `factors` holds `(column name, annual observations)` in column order.
pub fn align_annual(
    target_name: &str,
    target: &[(NaiveDate, f64)],
    factors: &[(String, Vec<(NaiveDate, f64)>)],
) -> (AlignedTable, Vec<AlignmentGap>) {
    let lookups: Vec<BTreeMap<NaiveDate, f64>> = factors
        .iter()
        .map(|(_, obs)| obs.iter().copied().collect())
        .collect();

    let mut columns = Vec::with_capacity(factors.len() + 1);
    columns.push(target_name.to_string());
    columns.extend(factors.iter().map(|(name, _)| name.clone()));

    let mut dates = Vec::with_capacity(target.len());
    let mut rows = Vec::with_capacity(target.len());
    let mut gaps = Vec::new();

    for &(date, y) in target {
        let mut row = Vec::with_capacity(columns.len());
        row.push(y);
        let mut missing = Vec::new();
        for ((name, _), lookup) in factors.iter().zip(&lookups) {
            match lookup.get(&date) {
                Some(&v) => row.push(v),
                None => missing.push(name.clone()),
            }
        }
        if missing.is_empty() {
            dates.push(date);
            rows.push(row);
        } else {
            gaps.push(AlignmentGap { date, missing });
        }
    }

    (AlignedTable { dates, columns, rows }, gaps)
}
