//! Read/write parameter JSON files.
//!
//! A params file is the "portable" representation of a fit: the fitted
//! parameters, the factor vector they were projected with, and run metadata.
//! The schema is defined by `domain::ParamsFile`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::domain::{FactorVector, ParamsFile};
use crate::error::{FactorError, Result};

pub fn write_params_json(path: &Path, params: &ParamsFile) -> Result<()> {
    let file = File::create(path).map_err(|e| FactorError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, params)?;
    writer.flush().map_err(|e| FactorError::io(path, e))?;
    info!(path = %path.display(), "wrote params JSON");
    Ok(())
}

pub fn read_params_json(path: &Path) -> Result<ParamsFile> {
    let file = File::open(path).map_err(|e| FactorError::io(path, e))?;
    let mut params: ParamsFile = serde_json::from_reader(BufReader::new(file))?;
    if params.params.loadings.len() != params.params.factor_names.len() {
        return Err(FactorError::shape(
            "params file loadings vs names",
            params.params.factor_names.len(),
            params.params.loadings.len(),
        ));
    }
    // Deserialization skips `FactorVector::new`, so re-check the pairing here.
    let current = params.current_factors;
    params.current_factors = FactorVector::new(current.names, current.values)?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{FactorOverride, FittedParams};

    fn sample_file() -> ParamsFile {
        ParamsFile {
            tool: "mf".to_string(),
            target: "SP500".to_string(),
            start: NaiveDate::from_ymd_opt(2013, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            n_obs: 8,
            params: FittedParams {
                intercept: 1.0,
                factor_names: vec!["A".into(), "B".into()],
                loadings: vec![2.0, 3.0],
                last_residual: 0.5,
            },
            current_factors: FactorVector::new(vec!["A".into(), "B".into()], vec![1.0, 1.0]).unwrap(),
            projected_return: 6.5,
        }
    }

    #[test]
    fn params_file_survives_disk() {
        let path = std::env::temp_dir().join(format!("mf_params_{}.json", std::process::id()));
        let file = sample_file();

        write_params_json(&path, &file).unwrap();
        let back = read_params_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.params, file.params);
        assert_eq!(back.current_factors, file.current_factors);
        assert_eq!(back.start, file.start);
    }

    #[test]
    fn malformed_json_is_reported() {
        let path = std::env::temp_dir().join(format!("mf_params_bad_{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_params_json(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, FactorError::Json(_)));
    }

    #[test]
    fn current_factors_with_unpaired_values_are_rejected() {
        let path = std::env::temp_dir().join(format!("mf_params_unpaired_{}.json", std::process::id()));
        let mut json = serde_json::to_value(sample_file()).unwrap();
        json["current_factors"]["values"] = serde_json::json!([1.0]);
        std::fs::write(&path, json.to_string()).unwrap();

        let err = read_params_json(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(
            matches!(err, FactorError::ShapeMismatch { expected: 2, got: 1, .. }),
            "{err}"
        );
    }

    #[test]
    fn unpaired_vector_override_errors_instead_of_panicking() {
        let mut factors = FactorVector {
            names: vec!["A".into(), "B".into()],
            values: vec![1.0],
        };
        let ov: FactorOverride = "B=2".parse().unwrap();
        let err = factors.apply_overrides(&[ov]).unwrap_err();
        assert!(matches!(err, FactorError::ShapeMismatch { .. }), "{err}");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn write_failure_surfaces_on_flush() {
        // Writes to /dev/full fail with ENOSPC; the JSON fits in the buffer,
        // so the failure only shows up when the writer is flushed.
        let err = write_params_json(Path::new("/dev/full"), &sample_file()).unwrap_err();
        assert!(matches!(err, FactorError::Io { .. }), "{err}");
    }
}
