//! Error types for QC data ingestion.

use std::path::PathBuf;

use qc_model::{ConfigError, DataError};
use thiserror::Error;

/// Errors that can occur while reading configuration or data files.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid delimited text.
    #[error("failed to parse {path}: {message}")]
    Csv { path: PathBuf, message: String },

    /// A schema or routine entry is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A data line does not match the schema.
    #[error("{path}: {source}")]
    Data {
        path: PathBuf,
        #[source]
        source: DataError,
    },
}

impl IngestError {
    pub(crate) fn csv(path: impl Into<PathBuf>, err: &csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::Data {
            path: PathBuf::from("cruise.csv"),
            source: DataError::NoSuchColumnIndex { line: 3, index: 9 },
        };
        assert_eq!(
            err.to_string(),
            "cruise.csv: line 3: there is no column with index 9"
        );
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: IngestError = ConfigError::new("columns.csv", "No columns are configured").into();
        assert_eq!(err.to_string(), "columns.csv: No columns are configured");
    }
}
