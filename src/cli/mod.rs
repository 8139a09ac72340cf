//! Command-line parsing for the macro factor model.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the data/fitting code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{DEFAULT_TARGET, FactorOverride, FactorSpec, SourceKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mf", version, about = "Macro factor model for an equity index (FRED-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch data, fit the model, print the summary and projection, and optionally plot/export.
    Fit(FitArgs),
    /// Run the same pipeline and open the interactive chart.
    Tui(FitArgs),
    /// Re-project a return from a saved params JSON.
    Project(ProjectArgs),
}

/// Options shared by `fit` and `tui`.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// First observation date (YYYY-MM-DD).
    #[arg(long, default_value = "2013-01-01")]
    pub start: NaiveDate,

    /// Last observation date (YYYY-MM-DD).
    #[arg(long, default_value = "2023-01-01")]
    pub end: NaiveDate,

    /// Target index series id.
    #[arg(long, default_value = DEFAULT_TARGET)]
    pub target: String,

    /// Macro factor as SERIES_ID=NAME (repeatable; defaults to the five standard factors).
    #[arg(long = "series", value_name = "ID=NAME")]
    pub series: Vec<FactorSpec>,

    /// Override a current factor value: NAME=VALUE or NAME=*SCALE (repeatable).
    #[arg(long = "override", value_name = "NAME=VALUE")]
    pub overrides: Vec<FactorOverride>,

    /// Keep rows inside the crisis/pandemic exclusion windows.
    #[arg(long)]
    pub no_exclusions: bool,

    /// Data source.
    #[arg(long, value_enum, default_value_t = SourceKind::Fred)]
    pub source: SourceKind,

    /// Seed for the synthetic source.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export per-year observed/fitted/residual rows to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export fitted parameters (and current factors) to JSON.
    #[arg(long = "export-params")]
    pub export_params: Option<PathBuf>,
}

/// Options for projecting from a saved fit.
#[derive(Debug, Parser)]
pub struct ProjectArgs {
    /// Params JSON produced by `mf fit --export-params`.
    #[arg(long, value_name = "JSON")]
    pub params: PathBuf,

    /// Factor value: NAME=VALUE or NAME=*SCALE relative to the saved value (repeatable).
    #[arg(long = "factor", value_name = "NAME=VALUE")]
    pub factors: Vec<FactorOverride>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_defaults() {
        let cli = Cli::parse_from(["mf", "fit"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2013, 1, 1).unwrap());
        assert_eq!(args.target, "SP500");
        assert!(args.series.is_empty());
        assert_eq!(args.source, SourceKind::Fred);
    }

    #[test]
    fn repeated_series_and_overrides() {
        let cli = Cli::parse_from([
            "mf",
            "fit",
            "--series",
            "GDPC1=GDP",
            "--series",
            "UNRATE=UNRATE",
            "--override",
            "GDP=*1.009",
            "--source",
            "synthetic",
        ]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.series.len(), 2);
        assert_eq!(args.series[0].name, "GDP");
        assert_eq!(args.overrides[0].name, "GDP");
        assert_eq!(args.source, SourceKind::Synthetic);
    }

    #[test]
    fn malformed_override_is_rejected() {
        assert!(Cli::try_parse_from(["mf", "fit", "--override", "GDP"]).is_err());
    }
}
