//! OLS factor-model fit and regression summary.
//!
//! Model:
//!
//! ```text
//! y_t = a + Σ_k b_k F_{t,k} + ε_t
//! ```
//!
//! The fit keeps the full fitted/residual vectors for plotting and exports,
//! but `FittedParams` only carries the residual of the final observation,
//! which is what the point projection adds back.

use nalgebra::DVector;
use tracing::{debug, info};

use crate::domain::{FactorTable, FittedParams, TargetSeries};
use crate::error::{FactorError, Result};
use crate::math::{design_with_intercept, solve_least_squares};

/// Name of the intercept row in summaries.
pub const INTERCEPT_NAME: &str = "const";

/// Per-coefficient statistics.
#[derive(Debug, Clone)]
pub struct CoefficientStat {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
}

/// Regression diagnostics, in the spirit of a statsmodels OLS summary.
#[derive(Debug, Clone)]
pub struct RegressionSummary {
    pub n_obs: usize,
    /// Number of factors (excluding the intercept).
    pub n_factors: usize,
    pub df_resid: usize,
    pub sse: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f_statistic: f64,
    /// Residual standard error `sqrt(SSE / df_resid)`.
    pub sigma: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub durbin_watson: f64,
    pub condition_number: f64,
    /// Intercept first, then factors in column order.
    pub coefficients: Vec<CoefficientStat>,
}

#[derive(Debug, Clone)]
pub struct FactorModelFit {
    pub params: FittedParams,
    pub fitted: Vec<f64>,
    pub residuals: Vec<f64>,
    pub summary: RegressionSummary,
}

/// Regress `target` on `factors` plus an intercept.
pub fn fit_factor_model(target: &TargetSeries, factors: &FactorTable) -> Result<FactorModelFit> {
    let n = factors.n_rows();
    let k = factors.n_factors();
    if target.values.len() != n {
        return Err(FactorError::shape("target vs factor rows", n, target.values.len()));
    }
    if k == 0 {
        return Err(FactorError::ModelFit("no factor columns".to_string()));
    }

    let x = design_with_intercept(&factors.rows, k)?;
    let y = DVector::from_column_slice(&target.values);
    let ls = solve_least_squares(&x, &y)?;

    let fitted_v = &x * &ls.beta;
    let resid_v = &y - &fitted_v;
    let fitted: Vec<f64> = fitted_v.iter().copied().collect();
    let residuals: Vec<f64> = resid_v.iter().copied().collect();

    let p = k + 1;
    let df_resid = n - p;
    let sse: f64 = residuals.iter().map(|e| e * e).sum();
    let mean_y = target.values.iter().sum::<f64>() / n as f64;
    let tss: f64 = target.values.iter().map(|v| (v - mean_y).powi(2)).sum();

    let r_squared = if tss > 0.0 { 1.0 - sse / tss } else { f64::NAN };
    let adj_r_squared = 1.0 - (n as f64 - 1.0) / df_resid as f64 * (1.0 - r_squared);
    let sigma2 = sse / df_resid as f64;
    let f_statistic = ((tss - sse) / k as f64) / sigma2;

    let n_f = n as f64;
    let log_likelihood = -n_f / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (sse / n_f).ln() + 1.0);
    let aic = -2.0 * log_likelihood + 2.0 * p as f64;
    let bic = -2.0 * log_likelihood + p as f64 * n_f.ln();
    let durbin_watson = if sse > 0.0 {
        residuals.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum::<f64>() / sse
    } else {
        f64::NAN
    };

    let names = std::iter::once(INTERCEPT_NAME.to_string()).chain(factors.names.iter().cloned());
    let coefficients = names
        .zip(ls.beta.iter())
        .enumerate()
        .map(|(j, (name, &estimate))| {
            let std_error = (sigma2 * ls.xtx_inv[(j, j)]).max(0.0).sqrt();
            CoefficientStat {
                name,
                estimate,
                std_error,
                t_value: estimate / std_error,
            }
        })
        .collect();

    let last_residual = residuals.last().copied().unwrap_or(0.0);
    let params = FittedParams {
        intercept: ls.beta[0],
        factor_names: factors.names.clone(),
        loadings: ls.beta.iter().skip(1).copied().collect(),
        last_residual,
    };

    debug!(condition_number = ls.condition_number, "design conditioning");
    info!(n_obs = n, n_factors = k, r_squared, "fitted factor model");

    Ok(FactorModelFit {
        params,
        fitted,
        residuals,
        summary: RegressionSummary {
            n_obs: n,
            n_factors: k,
            df_resid,
            sse,
            r_squared,
            adj_r_squared,
            f_statistic,
            sigma: sigma2.sqrt(),
            log_likelihood,
            aic,
            bic,
            durbin_watson,
            condition_number: ls.condition_number,
            coefficients,
        },
    })
}
