//! Error types.
//!
//! Library code returns [`FactorError`]; the binary wraps it in [`AppError`],
//! which carries the process exit code:
//!
//! - `2`: configuration, usage or file IO
//! - `3`: model fitting or vector shape problems
//! - `4`: data retrieval or terminal failures

use std::path::PathBuf;

use thiserror::Error;

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, FactorError>;

/// Errors produced while acquiring data, fitting or projecting.
#[derive(Debug, Error)]
pub enum FactorError {
    /// Network, HTTP or payload failure for a named series.
    #[error("Data retrieval failed for series {series}: {reason}")]
    DataRetrieval { series: String, reason: String },

    /// A required credential is not set.
    #[error("Missing {0} in environment (.env).")]
    MissingCredential(String),

    /// Underdetermined or singular regression, or non-finite inputs.
    #[error("Model fit failed: {0}")]
    ModelFit(String),

    /// Two vectors that must line up positionally do not.
    #[error("Shape mismatch in {context}: expected length {expected}, got {got}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        got: usize,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl FactorError {
    pub fn retrieval(series: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataRetrieval {
            series: series.into(),
            reason: reason.into(),
        }
    }

    pub fn shape(context: impl Into<String>, expected: usize, got: usize) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            expected,
            got,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Io { .. } | Self::Json(_) | Self::Csv(_) => 2,
            Self::ModelFit(_) | Self::ShapeMismatch { .. } => 3,
            Self::DataRetrieval { .. } | Self::MissingCredential(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FactorError> for AppError {
    fn from(err: FactorError) -> Self {
        Self::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
