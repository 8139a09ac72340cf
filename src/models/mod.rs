//! Evaluating a fitted factor model.
//!
//! Kept as small, pure functions so reporting, plotting and `mf project` share
//! one definition of `a + b·F (+ ε)`.

pub mod projection;

pub use projection::*;
