//! Synthetic macro series with known factor loadings.
//!
//! Each factor is a daily Gaussian random walk around its own level; the
//! target is an exact affine combination of the factors plus Gaussian noise.
//! Used for offline runs (`--source synthetic`) and for end-to-end tests,
//! where the true intercept and loadings are known.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::SeriesSource;
use crate::domain::AcquisitionConfig;
use crate::error::{FactorError, Result};

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub intercept: f64,
    /// Std dev of the additive target noise.
    pub noise_sd: f64,
    /// Std dev of each daily factor step.
    pub step_sd: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            intercept: 1000.0,
            noise_sd: 25.0,
            step_sd: 0.05,
        }
    }
}

/// Loading of the `k`-th synthetic factor: alternating sign, growing magnitude.
pub fn synthetic_loading(k: usize) -> f64 {
    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
    sign * 40.0 * (k + 1) as f64
}

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    series: HashMap<String, Vec<(NaiveDate, f64)>>,
    intercept: f64,
    loadings: Vec<f64>,
}

impl SyntheticSource {
    /// Generate daily series for the target and every configured factor.
    pub fn generate(acq: &AcquisitionConfig, config: &SyntheticConfig) -> Result<Self> {
        acq.validate()?;
        if !(config.noise_sd.is_finite() && config.noise_sd >= 0.0) {
            return Err(FactorError::Config("synthetic noise_sd must be >= 0".to_string()));
        }
        if !(config.step_sd.is_finite() && config.step_sd > 0.0) {
            return Err(FactorError::Config("synthetic step_sd must be > 0".to_string()));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| FactorError::Config(format!("noise distribution error: {e}")))?;

        let n_days = (acq.end - acq.start).num_days() as usize + 1;
        let k = acq.factors.len();
        let loadings: Vec<f64> = (0..k).map(synthetic_loading).collect();

        let mut levels: Vec<f64> = (0..k).map(|i| 2.0 + i as f64).collect();
        let mut factor_obs: Vec<Vec<(NaiveDate, f64)>> = vec![Vec::with_capacity(n_days); k];
        let mut target_obs = Vec::with_capacity(n_days);

        for day in 0..n_days {
            let date = acq.start + Duration::days(day as i64);
            let mut y = config.intercept;
            for (i, level) in levels.iter_mut().enumerate() {
                *level += config.step_sd * normal.sample(&mut rng);
                factor_obs[i].push((date, *level));
                y += loadings[i] * *level;
            }
            y += config.noise_sd * normal.sample(&mut rng);
            target_obs.push((date, y));
        }

        let mut series = HashMap::with_capacity(k + 1);
        series.insert(acq.target.clone(), target_obs);
        for (spec, obs) in acq.factors.iter().zip(factor_obs) {
            series.insert(spec.series_id.clone(), obs);
        }

        Ok(Self {
            series,
            intercept: config.intercept,
            loadings,
        })
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// True loadings, in factor column order.
    pub fn loadings(&self) -> &[f64] {
        &self.loadings
    }
}

impl SeriesSource for SyntheticSource {
    fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>> {
        let obs = self
            .series
            .get(series_id)
            .ok_or_else(|| FactorError::retrieval(series_id, "series does not exist"))?;
        Ok(obs
            .iter()
            .copied()
            .filter(|(d, _)| *d >= start && *d <= end)
            .collect())
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}
