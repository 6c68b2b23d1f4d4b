//! Error types for QC routines.

use qc_model::DataError;
use thiserror::Error;

/// Errors raised while configuring or running a routine.
#[derive(Debug, Error)]
pub enum RoutineError {
    /// The routine's parameters are invalid for the schema.
    #[error("{routine}: {reason}")]
    Parameters { routine: String, reason: String },

    /// The routine could not process a record.
    #[error("{routine}: line {line}: {reason}")]
    Execution {
        routine: String,
        line: usize,
        reason: String,
    },

    /// A record value or column reference was invalid.
    #[error(transparent)]
    Data(#[from] DataError),
}

impl RoutineError {
    pub fn parameters(routine: &str, reason: impl Into<String>) -> Self {
        Self::Parameters {
            routine: routine.to_string(),
            reason: reason.into(),
        }
    }

    /// Reason without the routine name, for errors that already carry it.
    pub fn reason(&self) -> String {
        match self {
            Self::Parameters { reason, .. } | Self::Execution { reason, .. } => reason.clone(),
            Self::Data(err) => err.to_string(),
        }
    }
}

/// Result type for routine operations.
pub type Result<T> = std::result::Result<T, RoutineError>;
