//! Formatted terminal output.
//!
//! We keep formatting code in one place so the fitting code stays clean and
//! output changes are localized.

use crate::domain::{Dataset, FittedParams, RunConfig};
use crate::fit::RegressionSummary;

/// Target series, factor table, exclusions and current factor values.
pub fn format_dataset(dataset: &Dataset) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}:\n", dataset.target.name));
    for (date, value) in dataset.target.dates.iter().zip(&dataset.target.values) {
        out.push_str(&format!("  {date}  {value:>14.4}\n"));
    }

    out.push_str("\nMacro factors:\n");
    let mut header = format!("  {:<10}", "date");
    for name in &dataset.factors.names {
        header.push_str(&format!(" {name:>12}"));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    for (date, row) in dataset.factors.dates.iter().zip(&dataset.factors.rows) {
        let mut line = format!("  {date}");
        for v in row {
            line.push_str(&format!(" {v:>12.4}"));
        }
        out.push_str(&line);
        out.push('\n');
    }

    if !dataset.excluded.is_empty() {
        let dates: Vec<String> = dataset.excluded.iter().map(ToString::to_string).collect();
        out.push_str(&format!("\nExcluded rows: {}\n", dates.join(", ")));
    }

    out.push_str(&format!("\nCurrent factor values (from {}):\n", dataset.current_date));
    out.push_str(&fmt_named(&dataset.current_factors.names, &dataset.current_factors.values));

    out
}

/// Regression summary table.
pub fn format_summary(summary: &RegressionSummary, target_name: &str, config: &RunConfig) -> String {
    let mut out = String::new();
    let rule = "=".repeat(72);

    out.push_str(&rule);
    out.push('\n');
    out.push_str("OLS factor model\n");
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!(
        "Dep. variable: {:<20} Observations:   {:>10}\n",
        target_name, summary.n_obs
    ));
    out.push_str(&format!(
        "Start:         {:<20} Df residuals:   {:>10}\n",
        config.acquisition.start.to_string(),
        summary.df_resid
    ));
    out.push_str(&format!(
        "End:           {:<20} Df model:       {:>10}\n",
        config.acquisition.end.to_string(),
        summary.n_factors
    ));
    out.push_str(&format!(
        "R-squared:     {:<20.4} F-statistic:    {:>10.4}\n",
        summary.r_squared, summary.f_statistic
    ));
    out.push_str(&format!(
        "Adj. R-squared:{:<20.4} Log-likelihood: {:>10.3}\n",
        summary.adj_r_squared, summary.log_likelihood
    ));
    out.push_str(&format!(
        "Resid. std err:{:<20.4} AIC:            {:>10.3}\n",
        summary.sigma, summary.aic
    ));
    out.push_str(&format!(
        "Durbin-Watson: {:<20.4} BIC:            {:>10.3}\n",
        summary.durbin_watson, summary.bic
    ));
    out.push_str(&format!("Cond. No.:     {:.3e}\n", summary.condition_number));

    out.push_str(&"-".repeat(72));
    out.push('\n');
    out.push_str(&format!(
        "{:<16} {:>16} {:>16} {:>12}\n",
        "", "coef", "std err", "t"
    ));
    out.push_str(&"-".repeat(72));
    out.push('\n');
    for c in &summary.coefficients {
        out.push_str(&format!(
            "{:<16} {:>16.6} {:>16.6} {:>12.3}\n",
            c.name, c.estimate, c.std_error, c.t_value
        ));
    }
    out.push_str(&rule);
    out.push('\n');

    out
}

/// Intercept, loadings and last residual.
pub fn format_params(params: &FittedParams) -> String {
    let mut out = String::new();
    out.push_str(&format!("Intercept: {:.6}\n", params.intercept));
    out.push_str("Loadings:\n");
    out.push_str(&fmt_named(&params.factor_names, &params.loadings));
    out.push_str(&format!("Last residual: {:.6}\n", params.last_residual));
    out
}

pub fn format_projection(value: f64) -> String {
    format!("Projected return (a + b·F + ε): {value:.6}")
}

fn fmt_named(names: &[String], values: &[f64]) -> String {
    let mut out = String::new();
    for (name, v) in names.iter().zip(values) {
        out.push_str(&format!("  {name:<12} {v:>14.6}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{AcquisitionConfig, SourceKind, default_exclusions, default_factor_specs};

    #[test]
    fn params_block_lists_loadings_in_order() {
        let params = FittedParams {
            intercept: 1.5,
            factor_names: vec!["RATES".into(), "GDP".into()],
            loadings: vec![-2.0, 0.25],
            last_residual: 0.1,
        };
        let txt = format_params(&params);
        let rates = txt.find("RATES").unwrap();
        let gdp = txt.find("GDP").unwrap();
        assert!(rates < gdp);
        assert!(txt.starts_with("Intercept: 1.500000\n"));
        assert!(txt.ends_with("Last residual: 0.100000\n"));
    }

    fn summary() -> RegressionSummary {
        RegressionSummary {
            n_obs: 8,
            n_factors: 2,
            df_resid: 5,
            sse: 2.7,
            r_squared: 0.69,
            adj_r_squared: 0.566,
            f_statistic: 5.56,
            sigma: 0.73,
            log_likelihood: -7.1,
            aic: 20.2,
            bic: 20.4,
            durbin_watson: 3.27,
            condition_number: 12.5,
            coefficients: Vec::new(),
        }
    }

    fn config() -> RunConfig {
        RunConfig {
            acquisition: AcquisitionConfig {
                start: NaiveDate::from_ymd_opt(2013, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                target: "SP500".to_string(),
                factors: default_factor_specs(),
                exclusions: default_exclusions(),
                overrides: Vec::new(),
            },
            source: SourceKind::Synthetic,
            seed: 42,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_results: None,
            export_params: None,
        }
    }

    #[test]
    fn summary_rows_share_one_column_layout() {
        let txt = format_summary(&summary(), "SP500", &config());
        for label in ["Observations:", "Df residuals:", "Df model:", "F-statistic:", "Log-likelihood:", "AIC:", "BIC:"] {
            let line = txt.lines().find(|l| l.contains(label)).unwrap();
            assert_eq!(line.find(label), Some(36), "{line}");
        }
        assert!(txt.contains("Start:         2013-01-01"));
        assert!(txt.contains("End:           2023-01-01"));
    }

    #[test]
    fn projection_line() {
        assert_eq!(format_projection(6.5), "Projected return (a + b·F + ε): 6.500000");
    }
}
