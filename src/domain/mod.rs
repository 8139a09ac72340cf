//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run configuration (`RunConfig`, `AcquisitionConfig`, `FactorSpec`, `ExclusionWindow`)
//! - the annual table and its target/factor split (`AlignedTable`, `TargetSeries`, `FactorTable`)
//! - fit outputs and projection inputs (`FittedParams`, `FactorVector`, `ParamsFile`)

pub mod types;

pub use types::*;
