//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - built by the acquisition step and consumed by the fitter
//! - printed by the report module
//! - exported to CSV/JSON and reloaded by `mf project`

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{FactorError, Result};

/// Default target index series (FRED id).
pub const DEFAULT_TARGET: &str = "SP500";

/// Default macro factors as `(FRED id, column name)`, in column order.
pub const DEFAULT_FACTORS: [(&str, &str); 5] = [
    ("RIFSPFFNA", "RATES"),
    ("GDPC1", "GDP"),
    ("FPCPITOTLZGUSA", "CPI"),
    ("UNRATE", "UNRATE"),
    ("UMCSENT", "CONS_SENT"),
];

/// Where series observations come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// FRED HTTP API (requires `FRED_API_KEY`).
    Fred,
    /// Seeded synthetic data with known loadings (offline).
    Synthetic,
}

/// One macro factor: external series id plus the column name used in tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorSpec {
    pub series_id: String,
    pub name: String,
}

impl FactorSpec {
    pub fn new(series_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            series_id: series_id.into(),
            name: name.into(),
        }
    }
}

/// Parses `ID=NAME`, or a bare `ID` (name defaults to the id).
impl FromStr for FactorSpec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (id, name) = match s.split_once('=') {
            Some((id, name)) => (id.trim(), name.trim()),
            None => (s.trim(), s.trim()),
        };
        if id.is_empty() || name.is_empty() {
            return Err(format!("expected SERIES_ID=NAME, got '{s}'"));
        }
        Ok(Self::new(id, name))
    }
}

pub fn default_factor_specs() -> Vec<FactorSpec> {
    DEFAULT_FACTORS
        .iter()
        .map(|&(id, name)| FactorSpec::new(id, name))
        .collect()
}

/// Inclusive date range whose rows are dropped before fitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionWindow {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ExclusionWindow {
    pub fn new(label: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Financial-crisis and pandemic windows.
pub fn default_exclusions() -> Vec<ExclusionWindow> {
    let ymd = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);
    vec![
        ExclusionWindow::new("financial crisis", ymd(2007, 12, 1), ymd(2009, 12, 1)),
        ExclusionWindow::new("pandemic", ymd(2020, 1, 1), ymd(2020, 12, 31)),
    ]
}

/// How a single current-factor value is overridden.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverrideRule {
    /// Replace the observed value.
    Fixed(f64),
    /// Multiply the observed value.
    Scale(f64),
}

impl OverrideRule {
    pub fn apply(self, observed: f64) -> f64 {
        match self {
            Self::Fixed(v) => v,
            Self::Scale(k) => observed * k,
        }
    }
}

/// Named override of a current factor value.
///
/// Syntax: `NAME=VALUE` replaces, `NAME=*SCALE` multiplies.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorOverride {
    pub name: String,
    pub rule: OverrideRule,
}

impl FromStr for FactorOverride {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (name, raw) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=VALUE or NAME=*SCALE, got '{s}'"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("missing factor name in '{s}'"));
        }

        let raw = raw.trim();
        let rule = match raw.strip_prefix('*') {
            Some(scale) => OverrideRule::Scale(parse_finite(scale.trim(), s)?),
            None => OverrideRule::Fixed(parse_finite(raw, s)?),
        };

        Ok(Self {
            name: name.to_string(),
            rule,
        })
    }
}

fn parse_finite(number: &str, whole: &str) -> std::result::Result<f64, String> {
    let value: f64 = number
        .parse()
        .map_err(|e| format!("invalid number '{number}' in '{whole}': {e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("non-finite value in '{whole}'"))
    }
}

/// Annual table: target column first, then factor columns in configured order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl AlignedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn target_name(&self) -> &str {
        self.columns.first().map(String::as_str).unwrap_or("")
    }

    pub fn factor_names(&self) -> &[String] {
        self.columns.get(1..).unwrap_or(&[])
    }

    /// Most recent row as `(date, factor values)`, target column excluded.
    pub fn last_factor_row(&self) -> Option<(NaiveDate, &[f64])> {
        let date = *self.dates.last()?;
        let row = self.rows.last()?;
        Some((date, row.get(1..).unwrap_or(&[])))
    }

    /// Drop every row dated inside any window. Returns the dropped dates.
    pub fn retain_outside(&mut self, windows: &[ExclusionWindow]) -> Vec<NaiveDate> {
        let mut dropped = Vec::new();
        let mut dates = Vec::with_capacity(self.dates.len());
        let mut rows = Vec::with_capacity(self.rows.len());
        for (date, row) in self.dates.drain(..).zip(self.rows.drain(..)) {
            if windows.iter().any(|w| w.contains(date)) {
                dropped.push(date);
            } else {
                dates.push(date);
                rows.push(row);
            }
        }
        self.dates = dates;
        self.rows = rows;
        dropped
    }

    /// Split into the target vector and the factor table.
    pub fn split(&self) -> (TargetSeries, FactorTable) {
        let target = TargetSeries {
            name: self.target_name().to_string(),
            dates: self.dates.clone(),
            values: self.rows.iter().map(|r| r[0]).collect(),
        };
        let factors = FactorTable {
            dates: self.dates.clone(),
            names: self.factor_names().to_vec(),
            rows: self.rows.iter().map(|r| r[1..].to_vec()).collect(),
        };
        (target, factors)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetSeries {
    pub name: String,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

/// N rows × K factor columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorTable {
    pub dates: Vec<NaiveDate>,
    pub names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FactorTable {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_factors(&self) -> usize {
        self.names.len()
    }
}

/// Factor state used for projection, ordered like the loadings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorVector {
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

impl FactorVector {
    pub fn new(names: Vec<String>, values: Vec<f64>) -> Result<Self> {
        if names.len() != values.len() {
            return Err(FactorError::shape("factor vector", names.len(), values.len()));
        }
        Ok(Self { names, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.values.get(idx).copied()
    }

    /// Apply overrides in order; an unknown factor name is a config error.
    pub fn apply_overrides(&mut self, overrides: &[FactorOverride]) -> Result<()> {
        for ov in overrides {
            let idx = self
                .names
                .iter()
                .position(|n| n == &ov.name)
                .ok_or_else(|| {
                    FactorError::Config(format!(
                        "override for unknown factor '{}' (known: {})",
                        ov.name,
                        self.names.join(", ")
                    ))
                })?;
            let (n_names, n_values) = (self.names.len(), self.values.len());
            let value = self
                .values
                .get_mut(idx)
                .ok_or_else(|| FactorError::shape("factor vector", n_names, n_values))?;
            *value = ov.rule.apply(*value);
        }
        Ok(())
    }
}

/// Fitted factor-model parameters. Immutable after fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedParams {
    pub intercept: f64,
    /// Names of the factor columns, aligned with `loadings`.
    pub factor_names: Vec<String>,
    pub loadings: Vec<f64>,
    /// Residual of the most recent observation.
    pub last_residual: f64,
}

/// Everything acquisition hands to the fitter.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Aligned table after exclusions.
    pub table: AlignedTable,
    pub target: TargetSeries,
    pub factors: FactorTable,
    /// Last observed factor row with overrides applied.
    pub current_factors: FactorVector,
    /// Date of the row `current_factors` was taken from.
    pub current_date: NaiveDate,
    /// Rows dropped by exclusion windows.
    pub excluded: Vec<NaiveDate>,
}

/// Inputs of the acquisition step.
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub target: String,
    pub factors: Vec<FactorSpec>,
    pub exclusions: Vec<ExclusionWindow>,
    pub overrides: Vec<FactorOverride>,
}

impl AcquisitionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(FactorError::Config(format!(
                "empty date range: start {} is not before end {}",
                self.start, self.end
            )));
        }
        if self.target.trim().is_empty() {
            return Err(FactorError::Config("target series id is empty".to_string()));
        }
        if self.factors.is_empty() {
            return Err(FactorError::Config("at least one macro factor is required".to_string()));
        }
        for (i, spec) in self.factors.iter().enumerate() {
            if self.factors[..i].iter().any(|s| s.name == spec.name) {
                return Err(FactorError::Config(format!("duplicate factor name '{}'", spec.name)));
            }
        }
        Ok(())
    }
}

/// A full run's configuration, derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub acquisition: AcquisitionConfig,
    pub source: SourceKind,
    /// Seed for the synthetic source.
    pub seed: u64,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_params: Option<PathBuf>,
}

/// A saved parameter file (JSON), reloaded by `mf project`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamsFile {
    pub tool: String,
    pub target: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub n_obs: usize,
    pub params: FittedParams,
    pub current_factors: FactorVector,
    pub projected_return: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn table() -> AlignedTable {
        AlignedTable {
            dates: vec![d(2005, 6, 1), d(2008, 6, 1), d(2020, 1, 1), d(2021, 1, 1)],
            columns: vec!["SP500".into(), "RATES".into(), "GDP".into()],
            rows: vec![
                vec![1.0, 10.0, 100.0],
                vec![2.0, 20.0, 200.0],
                vec![3.0, 30.0, 300.0],
                vec![4.0, 40.0, 400.0],
            ],
        }
    }

    #[test]
    fn exclusion_windows_drop_crisis_and_pandemic_rows() {
        let mut t = table();
        let dropped = t.retain_outside(&default_exclusions());
        assert_eq!(dropped, vec![d(2008, 6, 1), d(2020, 1, 1)]);
        assert!(!t.dates.contains(&d(2008, 6, 1)));
        assert!(t.dates.contains(&d(2005, 6, 1)));
        assert_eq!(t.rows, vec![vec![1.0, 10.0, 100.0], vec![4.0, 40.0, 400.0]]);
    }

    #[rstest]
    #[case(d(2007, 12, 1), true)]
    #[case(d(2009, 12, 1), true)]
    #[case(d(2009, 12, 2), false)]
    #[case(d(2007, 11, 30), false)]
    #[case(d(2020, 12, 31), true)]
    #[case(d(2021, 1, 1), false)]
    fn exclusion_bounds_are_inclusive(#[case] date: NaiveDate, #[case] excluded: bool) {
        assert_eq!(default_exclusions().iter().any(|w| w.contains(date)), excluded);
    }

    #[test]
    fn split_keeps_target_first_and_factor_order() {
        let (target, factors) = table().split();
        assert_eq!(target.name, "SP500");
        assert_eq!(target.values, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(factors.names, vec!["RATES", "GDP"]);
        let gdp: Vec<f64> = factors.rows.iter().map(|r| r[1]).collect();
        assert_eq!(gdp, vec![100.0, 200.0, 300.0, 400.0]);
        assert_eq!(factors.n_rows(), 4);
        assert_eq!(factors.n_factors(), 2);
    }

    #[test]
    fn last_factor_row_skips_target() {
        let t = table();
        let (date, row) = t.last_factor_row().unwrap();
        assert_eq!(date, d(2021, 1, 1));
        assert_eq!(row, &[40.0, 400.0]);
    }

    #[rstest]
    #[case("RATES=5.25", "RATES", OverrideRule::Fixed(5.25))]
    #[case("GDP=*1.009", "GDP", OverrideRule::Scale(1.009))]
    #[case(" CPI = 4 ", "CPI", OverrideRule::Fixed(4.0))]
    fn override_parses(#[case] raw: &str, #[case] name: &str, #[case] rule: OverrideRule) {
        let ov: FactorOverride = raw.parse().unwrap();
        assert_eq!(ov.name, name);
        assert_eq!(ov.rule, rule);
    }

    #[rstest]
    #[case("RATES")]
    #[case("=5")]
    #[case("RATES=abc")]
    #[case("RATES=*")]
    #[case("RATES=inf")]
    fn override_rejects_malformed(#[case] raw: &str) {
        assert!(raw.parse::<FactorOverride>().is_err());
    }

    #[test]
    fn overrides_apply_by_name() {
        let mut v = FactorVector::new(
            vec!["RATES".into(), "GDP".into(), "CPI".into()],
            vec![1.0, 200.0, 3.0],
        )
        .unwrap();
        let ovs: Vec<FactorOverride> = vec!["RATES=5.25".parse().unwrap(), "GDP=*1.5".parse().unwrap()];
        v.apply_overrides(&ovs).unwrap();
        assert_eq!(v.values, vec![5.25, 300.0, 3.0]);
        assert_eq!(v.get("GDP"), Some(300.0));
    }

    #[test]
    fn override_for_unknown_factor_is_config_error() {
        let mut v = FactorVector::new(vec!["RATES".into()], vec![1.0]).unwrap();
        let err = v
            .apply_overrides(&["NOPE=1".parse().unwrap()])
            .unwrap_err();
        assert!(matches!(err, FactorError::Config(_)));
    }

    #[test]
    fn factor_spec_parses_with_and_without_name() {
        let spec: FactorSpec = "GDPC1=GDP".parse().unwrap();
        assert_eq!(spec, FactorSpec::new("GDPC1", "GDP"));
        let bare: FactorSpec = "UNRATE".parse().unwrap();
        assert_eq!(bare, FactorSpec::new("UNRATE", "UNRATE"));
        assert!("=GDP".parse::<FactorSpec>().is_err());
    }

    #[test]
    fn acquisition_config_rejects_empty_range_and_duplicates() {
        let mut cfg = AcquisitionConfig {
            start: d(2023, 1, 1),
            end: d(2013, 1, 1),
            target: DEFAULT_TARGET.into(),
            factors: default_factor_specs(),
            exclusions: default_exclusions(),
            overrides: Vec::new(),
        };
        assert!(matches!(cfg.validate(), Err(FactorError::Config(_))));

        cfg.start = d(2013, 1, 1);
        cfg.end = d(2023, 1, 1);
        assert!(cfg.validate().is_ok());

        cfg.factors.push(FactorSpec::new("OTHER", "GDP"));
        assert!(matches!(cfg.validate(), Err(FactorError::Config(_))));
    }
}
