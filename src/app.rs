//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs the log subscriber
//! - runs acquisition + fit + projection
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, FitArgs, ProjectArgs};
use crate::domain::{AcquisitionConfig, RunConfig, default_exclusions, default_factor_specs};
use crate::error::AppError;
use crate::plot::ChartView;

pub mod pipeline;

/// Entry point for the `mf` binary.
pub fn run() -> Result<(), AppError> {
    // `mf` and `mf --source synthetic` behave like `mf fit ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal, so it only logs warnings and above.
    let default_filter = match cli.command {
        Command::Tui(_) => "warn",
        Command::Fit(_) | Command::Project(_) => "macro_factor=info,warn",
    };
    init_logging(default_filter);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Tui(args) => handle_tui(args),
        Command::Project(args) => handle_project(args),
    }
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A second init (tests, embedding) is not an error worth failing the run for.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_pipeline(&config)?;

    println!("{}", crate::report::format_dataset(&run.dataset));
    println!(
        "{}",
        crate::report::format_summary(&run.fit.summary, &run.dataset.target.name, &config)
    );
    println!("{}", crate::report::format_params(&run.fit.params));
    println!("{}", crate::report::format_projection(run.projected_return));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.rows,
            ChartView::Time,
            &run.dataset.target.name,
            config.plot_width,
            config.plot_height,
        );
        println!("\n{plot}");
    }

    if let Some(path) = &config.export_results {
        crate::io::write_results_csv(path, &run.rows)?;
    }
    if let Some(path) = &config.export_params {
        crate::io::write_params_json(path, &run.params_file(&config))?;
    }

    Ok(())
}

fn handle_tui(args: FitArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_pipeline(&config)?;
    crate::tui::run(run)
}

fn handle_project(args: ProjectArgs) -> Result<(), AppError> {
    let saved = crate::io::read_params_json(&args.params)?;
    let mut factors = saved.current_factors.clone();
    factors.apply_overrides(&args.factors)?;
    info!(factors = ?factors.values, "projecting from saved params");

    let value = saved.params.project(&factors)?;

    println!("{}", crate::report::format_params(&saved.params));
    println!("Factor values:");
    for (name, v) in factors.names.iter().zip(&factors.values) {
        println!("  {name:<12} {v:>14.6}");
    }
    println!("\n{}", crate::report::format_projection(value));
    Ok(())
}

pub fn run_config_from_args(args: &FitArgs) -> RunConfig {
    let factors = if args.series.is_empty() {
        default_factor_specs()
    } else {
        args.series.clone()
    };
    let exclusions = if args.no_exclusions {
        Vec::new()
    } else {
        default_exclusions()
    };

    RunConfig {
        acquisition: AcquisitionConfig {
            start: args.start,
            end: args.end,
            target: args.target.clone(),
            factors,
            exclusions,
            overrides: args.overrides.clone(),
        },
        source: args.source,
        seed: args.seed,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_params: args.export_params.clone(),
    }
}

/// Rewrite argv so `mf` defaults to `mf fit`.
///
/// Rules:
/// - `mf`                      -> `mf fit`
/// - `mf --start 2000-01-01`   -> `mf fit --start 2000-01-01`
/// - `mf --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "tui" | "project");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
        return argv;
    }

    argv
}
