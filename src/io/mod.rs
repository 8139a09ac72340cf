//! Input/output helpers.
//!
//! - per-year results CSV (`export`)
//! - fitted parameter JSON read/write (`params`)

pub mod export;
pub mod params;

pub use export::*;
pub use params::*;
