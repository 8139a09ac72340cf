//! Data sources and the acquisition step.
//!
//! - `fred`: FRED observations over blocking HTTP
//! - `sample`: seeded synthetic series with known loadings (offline runs, tests)
//! - `annual`: first-of-year resampling and table alignment
//! - `acquire`: fetch -> resample -> align -> current factors -> exclusions -> split

use chrono::NaiveDate;

use crate::error::Result;

pub mod acquire;
pub mod annual;
pub mod fred;
pub mod sample;

pub use acquire::acquire;
pub use annual::{align_annual, resample_annual_first};
pub use fred::{FredClient, FredConfig};
pub use sample::{SyntheticConfig, SyntheticSource};

/// A provider of dated observations keyed by series id.
pub trait SeriesSource {
    /// Observations for `series_id` within `start..=end`, ascending by date.
    fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}
