//! Reporting utilities: per-year observed/fitted rows and formatted output.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{FactorTable, FittedParams, TargetSeries};
use crate::error::{FactorError, Result};
use crate::models::fitted_values;

pub mod format;

pub use format::*;

/// One observation with its fitted value and residual.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationRow {
    pub date: NaiveDate,
    pub observed: f64,
    pub fitted: f64,
    pub residual: f64,
}

/// Compute fitted values and residuals for each observation from the parameters.
pub fn observation_rows(
    target: &TargetSeries,
    factors: &FactorTable,
    params: &FittedParams,
) -> Result<Vec<ObservationRow>> {
    let fitted = fitted_values(params, factors)?;
    if fitted.len() != target.values.len() {
        return Err(FactorError::shape("observed vs fitted", target.values.len(), fitted.len()));
    }
    let mut out = Vec::with_capacity(fitted.len());
    for ((&date, &observed), y_fit) in target.dates.iter().zip(&target.values).zip(fitted) {
        if !y_fit.is_finite() {
            return Err(FactorError::ModelFit(format!("non-finite fitted value for {date}")));
        }
        out.push(ObservationRow {
            date,
            observed,
            fitted: y_fit,
            residual: observed - y_fit,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_pair_observed_with_fitted() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        ];
        let target = TargetSeries {
            name: "SP500".into(),
            dates: dates.clone(),
            values: vec![10.0, 14.0],
        };
        let factors = FactorTable {
            dates,
            names: vec!["A".into()],
            rows: vec![vec![1.0], vec![2.0]],
        };
        let params = FittedParams {
            intercept: 5.0,
            factor_names: vec!["A".into()],
            loadings: vec![4.0],
            last_residual: 1.0,
        };

        let rows = observation_rows(&target, &factors, &params).unwrap();
        assert_eq!(rows[0].fitted, 9.0);
        assert_eq!(rows[0].residual, 1.0);
        assert_eq!(rows[1].fitted, 13.0);
        assert_eq!(rows[1].residual, 1.0);
    }
}
