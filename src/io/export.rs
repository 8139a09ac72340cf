//! Export per-year results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use tracing::info;

use crate::error::{FactorError, Result};
use crate::report::ObservationRow;

/// Write `date,observed,fitted,residual` rows to a CSV file.
pub fn write_results_csv(path: &Path, rows: &[ObservationRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| match e.into_kind() {
        csv::ErrorKind::Io(io) => FactorError::io(path, io),
        other => FactorError::Config(format!("cannot open '{}': {other:?}", path.display())),
    })?;

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| FactorError::io(path, e))?;

    info!(path = %path.display(), rows = rows.len(), "wrote results CSV");
    Ok(())
}
