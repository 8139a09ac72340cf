//! `macro-factor` library crate.
//!
//! The binary (`mf`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable against an in-memory source without network access
//! - acquisition, fitting and projection can be reused independently

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
