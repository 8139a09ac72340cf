//! Factor-model fitting.
//!
//! Responsibilities:
//!
//! - build the intercept-augmented design from the factor table
//! - solve OLS and reject underdetermined/singular designs
//! - produce `FittedParams` plus a regression summary

pub mod factor_model;

pub use factor_model::*;
