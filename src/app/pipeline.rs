//! Shared pipeline logic used by both the `fit` and `tui` front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! source -> acquisition -> OLS fit -> projection -> per-year rows
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::info;

use crate::data::{FredClient, SeriesSource, SyntheticConfig, SyntheticSource, acquire};
use crate::domain::{Dataset, ParamsFile, RunConfig, SourceKind};
use crate::error::Result;
use crate::fit::{FactorModelFit, fit_factor_model};
use crate::report::{ObservationRow, observation_rows};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub dataset: Dataset,
    pub fit: FactorModelFit,
    pub projected_return: f64,
    pub rows: Vec<ObservationRow>,
}

impl RunOutput {
    /// Portable params file for `mf project`.
    pub fn params_file(&self, config: &RunConfig) -> ParamsFile {
        ParamsFile {
            tool: "mf".to_string(),
            target: self.dataset.target.name.clone(),
            start: config.acquisition.start,
            end: config.acquisition.end,
            n_obs: self.fit.summary.n_obs,
            params: self.fit.params.clone(),
            current_factors: self.dataset.current_factors.clone(),
            projected_return: self.projected_return,
        }
    }
}

/// Build the configured source.
pub fn build_source(config: &RunConfig) -> Result<Box<dyn SeriesSource>> {
    match config.source {
        SourceKind::Fred => Ok(Box::new(FredClient::from_env()?)),
        SourceKind::Synthetic => {
            let synthetic = SyntheticConfig {
                seed: config.seed,
                ..SyntheticConfig::default()
            };
            Ok(Box::new(SyntheticSource::generate(&config.acquisition, &synthetic)?))
        }
    }
}

/// Execute the full pipeline against the configured source.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutput> {
    let source = build_source(config)?;
    run_with_source(source.as_ref(), config)
}

/// Execute the pipeline with an already-built source.
pub fn run_with_source(source: &dyn SeriesSource, config: &RunConfig) -> Result<RunOutput> {
    // 1) Annual dataset.
    let dataset = acquire(source, &config.acquisition)?;

    // 2) OLS fit.
    let fit = fit_factor_model(&dataset.target, &dataset.factors)?;

    // 3) Point projection from the current factor vector.
    let projected_return = fit.params.project(&dataset.current_factors)?;
    info!(projected_return, "projected return");

    // 4) Per-year rows for plots/exports.
    let rows = observation_rows(&dataset.target, &dataset.factors, &fit.params)?;

    Ok(RunOutput {
        dataset,
        fit,
        projected_return,
        rows,
    })
}
