//! Return projection and fitted values.

use crate::domain::{FactorTable, FactorVector, FittedParams};
use crate::error::{FactorError, Result};

/// `a + dot(b, f) + epsilon`.
///
/// `b` and `f` must have the same length; there is no truncation.
pub fn project(a: f64, b: &[f64], f: &[f64], epsilon: f64) -> Result<f64> {
    if b.len() != f.len() {
        return Err(FactorError::shape("projection (loadings vs factors)", b.len(), f.len()));
    }
    Ok(a + dot(b, f) + epsilon)
}

/// `a + b·row` for each row of the factor table.
pub fn fitted_values(params: &FittedParams, table: &FactorTable) -> Result<Vec<f64>> {
    table
        .rows
        .iter()
        .map(|row| project(params.intercept, &params.loadings, row, 0.0))
        .collect()
}

fn dot(b: &[f64], f: &[f64]) -> f64 {
    b.iter().zip(f).map(|(x, y)| x * y).sum()
}

impl FittedParams {
    /// Projected return for `factors`, including the last-period residual.
    ///
    /// Factor names must match the fitted columns in order.
    pub fn project(&self, factors: &FactorVector) -> Result<f64> {
        if factors.len() != self.loadings.len() {
            return Err(FactorError::shape(
                "projection (loadings vs factors)",
                self.loadings.len(),
                factors.len(),
            ));
        }
        if factors.names != self.factor_names {
            return Err(FactorError::Config(format!(
                "factor order [{}] does not match fitted order [{}]",
                factors.names.join(", "),
                self.factor_names.join(", ")
            )));
        }
        project(self.intercept, &self.loadings, &factors.values, self.last_residual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn params() -> FittedParams {
        FittedParams {
            intercept: 1.0,
            factor_names: vec!["A".into(), "B".into()],
            loadings: vec![2.0, 3.0],
            last_residual: 0.5,
        }
    }

    #[test]
    fn projection_is_affine_plus_residual() {
        assert_relative_eq!(project(1.0, &[2.0, 3.0], &[1.0, 1.0], 0.5).unwrap(), 6.5);
    }

    #[test]
    fn length_mismatch_is_shape_error() {
        let err = project(1.0, &[2.0, 3.0], &[1.0], 0.0).unwrap_err();
        assert!(matches!(err, FactorError::ShapeMismatch { expected: 2, got: 1, .. }));
    }

    #[test]
    fn params_project_checks_names_and_length() {
        let p = params();
        let f = FactorVector::new(vec!["A".into(), "B".into()], vec![1.0, 1.0]).unwrap();
        assert_relative_eq!(p.project(&f).unwrap(), 6.5);

        let swapped = FactorVector::new(vec!["B".into(), "A".into()], vec![1.0, 1.0]).unwrap();
        assert!(matches!(p.project(&swapped), Err(FactorError::Config(_))));

        let short = FactorVector::new(vec!["A".into()], vec![1.0]).unwrap();
        assert!(matches!(p.project(&short), Err(FactorError::ShapeMismatch { .. })));
    }

    #[test]
    fn fitted_values_exclude_residual() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let table = FactorTable {
            dates: vec![d, d],
            names: vec!["A".into(), "B".into()],
            rows: vec![vec![0.0, 0.0], vec![1.0, 2.0]],
        };
        assert_eq!(fitted_values(&params(), &table).unwrap(), vec![1.0, 9.0]);
    }
}
