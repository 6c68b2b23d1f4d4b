//! Error types shared by the QC model.
//!
//! The taxonomy mirrors how failures are handled by callers:
//!
//! - [`ConfigError`]: a schema or run-list entry is invalid. Fatal to the batch.
//! - [`DataError`]: a value or column reference in a record is invalid.
//!   Attributed to a line and column.
//! - [`RebuildCodeError`]: a persisted message code cannot be decoded.
//!   Always recoverable per code.

use std::fmt;

use thiserror::Error;

use crate::schema::DataKind;

/// A flag value that is not in the flag table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid flag value {value}")]
pub struct InvalidFlagError {
    pub value: i32,
}

/// Invalid schema or routine configuration.
///
/// `origin` names where the configuration came from (usually a file path).
/// Line and column are included when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub origin: String,
    pub line: Option<usize>,
    pub column: Option<String>,
    pub reason: String,
}

impl ConfigError {
    pub fn new(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            line: None,
            column: None,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub fn for_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.origin)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        if let Some(column) = &self.column {
            write!(f, ": column '{column}'")?;
        }
        write!(f, ": {}", self.reason)
    }
}

impl std::error::Error for ConfigError {}

/// Errors attributed to a single record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// A value does not match the column's data kind.
    #[error("line {line}: value '{value}' in column '{column}' (index {index}) is not {kind}")]
    InvalidData {
        line: usize,
        column: String,
        index: usize,
        value: String,
        kind: DataKind,
    },

    /// A column index outside the schema.
    #[error("line {line}: there is no column with index {index}")]
    NoSuchColumnIndex { line: usize, index: usize },

    /// A column name that is not in the schema.
    #[error("line {line}: there is no column with the name '{name}'")]
    NoSuchColumnName { line: usize, name: String },

    /// The record has the wrong number of values.
    #[error("line {line}: expected {expected} values, found {actual}")]
    FieldCount {
        line: usize,
        expected: usize,
        actual: usize,
    },

    /// A required column has no value.
    #[error("line {line}: required column '{column}' (index {index}) has no value")]
    MissingRequired {
        line: usize,
        column: String,
        index: usize,
    },
}

impl DataError {
    /// Line number the error refers to.
    pub fn line(&self) -> usize {
        match self {
            DataError::InvalidData { line, .. }
            | DataError::NoSuchColumnIndex { line, .. }
            | DataError::NoSuchColumnName { line, .. }
            | DataError::FieldCount { line, .. }
            | DataError::MissingRequired { line, .. } => *line,
        }
    }
}

/// Failures while decoding a rebuild code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RebuildCodeError {
    #[error("rebuild code must have 7 fields, found {found}: '{code}'")]
    FieldCount { code: String, found: usize },

    #[error("unknown message kind '{kind}'")]
    UnknownKind { kind: String },

    #[error("invalid line number '{value}'")]
    InvalidLineNumber { value: String },

    #[error("invalid column index '{value}'")]
    InvalidColumnIndex { value: String },

    #[error("invalid flag value '{value}'")]
    InvalidFlag { value: String },

    #[error("invalid escape sequence in '{value}'")]
    InvalidEscape { value: String },
}

/// A message kind id registered twice with different text templates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("message kind '{id}' is already registered with different templates")]
pub struct DuplicateKindError {
    pub id: String,
}
