//! The acquisition step: fetch, resample, align, exclude, split.

use tracing::{debug, info, warn};

use crate::data::SeriesSource;
use crate::data::annual::{align_annual, resample_annual_first};
use crate::domain::{AcquisitionConfig, Dataset, FactorVector};
use crate::error::{FactorError, Result};

/// Build the fitting dataset from `source`.
///
/// Current factor values come from the most recent aligned row, taken before
/// the exclusion windows are applied, with `config.overrides` applied on top.
pub fn acquire(source: &dyn SeriesSource, config: &AcquisitionConfig) -> Result<Dataset> {
    config.validate()?;

    let target_annual = fetch_annual(source, &config.target, config)?;

    let mut factor_columns = Vec::with_capacity(config.factors.len());
    for spec in &config.factors {
        let annual = fetch_annual(source, &spec.series_id, config)?;
        factor_columns.push((spec.name.clone(), annual));
    }

    let (mut table, gaps) = align_annual(&config.target, &target_annual, &factor_columns);
    for gap in &gaps {
        warn!(date = %gap.date, missing = ?gap.missing, "dropping year with missing factor values");
    }
    if table.is_empty() {
        return Err(FactorError::retrieval(
            &config.target,
            "no year has observations for the target and every factor",
        ));
    }

    let (current_date, last_row) = table
        .last_factor_row()
        .ok_or_else(|| FactorError::retrieval(&config.target, "aligned table has no rows"))?;
    let mut current_factors = FactorVector::new(table.factor_names().to_vec(), last_row.to_vec())?;
    for ov in &config.overrides {
        info!(factor = %ov.name, rule = ?ov.rule, "overriding current factor value");
    }
    current_factors.apply_overrides(&config.overrides)?;

    let excluded = table.retain_outside(&config.exclusions);
    if !excluded.is_empty() {
        info!(rows = excluded.len(), dates = ?excluded, "excluded rows inside exclusion windows");
    }
    if table.is_empty() {
        return Err(FactorError::Config(
            "every aligned row falls inside an exclusion window".to_string(),
        ));
    }

    let (target, factors) = table.split();
    info!(
        source = source.name(),
        rows = factors.n_rows(),
        factors = factors.n_factors(),
        "dataset ready"
    );

    Ok(Dataset {
        table,
        target,
        factors,
        current_factors,
        current_date,
        excluded,
    })
}

fn fetch_annual(
    source: &dyn SeriesSource,
    series_id: &str,
    config: &AcquisitionConfig,
) -> Result<Vec<(chrono::NaiveDate, f64)>> {
    let obs = source.fetch_series(series_id, config.start, config.end)?;
    if obs.is_empty() {
        return Err(FactorError::retrieval(
            series_id,
            format!("no observations between {} and {}", config.start, config.end),
        ));
    }
    let annual = resample_annual_first(&obs);
    debug!(series_id, raw = obs.len(), annual = annual.len(), "resampled to annual");
    Ok(annual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use crate::domain::{FactorSpec, OverrideRule, default_exclusions};

    /// In-memory source with hand-written observations.
    struct FixedSource(HashMap<&'static str, Vec<(NaiveDate, f64)>>);

    impl SeriesSource for FixedSource {
        fn fetch_series(
            &self,
            series_id: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<(NaiveDate, f64)>> {
            let obs = self
                .0
                .get(series_id)
                .ok_or_else(|| FactorError::retrieval(series_id, "series does not exist"))?;
            Ok(obs.iter().copied().filter(|(d, _)| *d >= start && *d <= end).collect())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn yearly(from: i32, to: i32, f: impl Fn(i32) -> f64) -> Vec<(NaiveDate, f64)> {
        // Two observations per year; only the first survives resampling.
        (from..=to)
            .flat_map(|y| [(d(y, 2, 1), f(y)), (d(y, 8, 1), f(y) + 1000.0)])
            .collect()
    }

    fn source() -> FixedSource {
        let mut m = HashMap::new();
        m.insert("SP500", yearly(2005, 2022, |y| y as f64));
        m.insert("RATE", yearly(2005, 2022, |y| (y - 2000) as f64 * 0.5));
        m.insert("GDP", yearly(2005, 2022, |y| ((y - 2000) * (y - 2000)) as f64));
        m.insert("EMPTY", Vec::new());
        FixedSource(m)
    }

    fn config() -> AcquisitionConfig {
        AcquisitionConfig {
            start: d(2005, 1, 1),
            end: d(2022, 12, 31),
            target: "SP500".to_string(),
            factors: vec![FactorSpec::new("RATE", "RATES"), FactorSpec::new("GDP", "GDP")],
            exclusions: default_exclusions(),
            overrides: Vec::new(),
        }
    }

    #[test]
    fn acquisition_excludes_windows_and_splits() {
        let ds = acquire(&source(), &config()).unwrap();

        assert_eq!(ds.table.columns, vec!["SP500", "RATES", "GDP"]);
        assert_eq!(ds.excluded, vec![d(2008, 1, 1), d(2009, 1, 1), d(2020, 1, 1)]);
        assert_eq!(ds.target.values.len(), 18 - 3);
        assert!(!ds.target.dates.contains(&d(2008, 1, 1)));
        assert!(ds.target.dates.contains(&d(2005, 1, 1)));
        assert_eq!(ds.target.values[0], 2005.0);
        assert_eq!(ds.factors.names, vec!["RATES", "GDP"]);
        assert_eq!(ds.factors.rows[0], vec![2.5, 25.0]);
    }

    #[test]
    fn current_factors_default_to_last_observed_row() {
        let ds = acquire(&source(), &config()).unwrap();
        assert_eq!(ds.current_date, d(2022, 1, 1));
        assert_eq!(ds.current_factors.values, vec![11.0, 484.0]);
    }

    #[test]
    fn overrides_are_explicit() {
        let mut cfg = config();
        cfg.overrides = vec!["RATES=5.25".parse().unwrap(), "GDP=*2".parse().unwrap()];
        let ds = acquire(&source(), &cfg).unwrap();
        assert_eq!(ds.current_factors.values, vec![5.25, 968.0]);
        assert_eq!(cfg.overrides[1].rule, OverrideRule::Scale(2.0));
    }

    #[test]
    fn current_factors_come_from_before_exclusion() {
        let mut cfg = config();
        cfg.end = d(2020, 12, 31);
        let ds = acquire(&source(), &cfg).unwrap();
        assert_eq!(ds.current_date, d(2020, 1, 1));
        assert!(!ds.target.dates.contains(&d(2020, 1, 1)));
    }

    #[test]
    fn unknown_and_empty_series_fail_fast() {
        let mut cfg = config();
        cfg.factors.push(FactorSpec::new("MISSING", "MISSING"));
        let err = acquire(&source(), &cfg).unwrap_err();
        assert!(matches!(err, FactorError::DataRetrieval { ref series, .. } if series == "MISSING"));

        let mut cfg = config();
        cfg.factors.push(FactorSpec::new("EMPTY", "EMPTY"));
        let err = acquire(&source(), &cfg).unwrap_err();
        assert!(matches!(err, FactorError::DataRetrieval { ref series, .. } if series == "EMPTY"));
    }

    #[test]
    fn empty_date_range_fails_before_fetching() {
        let mut cfg = config();
        cfg.start = d(2023, 1, 1);
        assert!(matches!(acquire(&source(), &cfg), Err(FactorError::Config(_))));
    }

    #[test]
    fn range_entirely_excluded_is_an_error() {
        let mut cfg = config();
        cfg.start = d(2008, 1, 1);
        cfg.end = d(2009, 6, 30);
        assert!(matches!(acquire(&source(), &cfg), Err(FactorError::Config(_))));
    }
}
