//! Data files: one record per line, values in schema order.

use std::path::Path;
use std::sync::Arc;

use csv::{ReaderBuilder, Trim};
use qc_model::kinds::{MISSING_VALUE, UNPARSEABLE_BOOLEAN, UNPARSEABLE_NUMBER};
use qc_model::{DataError, DataKind, Flag, Record, Schema};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::error::{IngestError, Result};
use crate::lines::read_text;

/// What to do with values that do not match their column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidDataPolicy {
    /// Stop reading at the first invalid or missing required value.
    #[default]
    Abort,
    /// Clear the value and attach a QC message to the record instead.
    Flag,
}

/// Options for reading a data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataReadOptions {
    /// Skip the first non-blank line.
    pub has_header: bool,
    pub delimiter: u8,
    pub invalid_data: InvalidDataPolicy,
}

impl Default for DataReadOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            invalid_data: InvalidDataPolicy::default(),
        }
    }
}

/// Reads every record of a data file.
pub fn read_records(
    path: &Path,
    schema: &Arc<Schema>,
    options: &DataReadOptions,
) -> Result<Vec<Record>> {
    let text = read_text(path)?;
    parse_records(path, &text, schema, options)
}

/// Parses records from text. `origin` is used in errors.
pub fn parse_records(
    origin: &Path,
    text: &str,
    schema: &Arc<Schema>,
    options: &DataReadOptions,
) -> Result<Vec<Record>> {
    let span = info_span!("read_records", path = %origin.display());
    let _guard = span.enter();

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(options.delimiter)
        .from_reader(text.as_bytes());

    let data_error = |source: DataError| IngestError::Data {
        path: origin.to_path_buf(),
        source,
    };

    let mut records = Vec::new();
    let mut flagged = 0_usize;
    for (position, result) in reader.records().enumerate() {
        let row = result.map_err(|e| IngestError::csv(origin, &e))?;
        if position == 0 && options.has_header {
            continue;
        }
        let line = row.position().map_or(0, |p| p.line() as usize);
        let values: Vec<Option<String>> = row
            .iter()
            .map(|value| (!value.is_empty()).then(|| value.to_string()))
            .collect();

        let record = match options.invalid_data {
            InvalidDataPolicy::Abort => {
                let record = Record::new(Arc::clone(schema), line, values).map_err(data_error)?;
                record.check_required().map_err(data_error)?;
                record
            }
            InvalidDataPolicy::Flag => {
                let record = flag_invalid(schema, line, values).map_err(data_error)?;
                if record.has_messages() {
                    flagged += 1;
                }
                record
            }
        };
        records.push(record);
    }

    if flagged > 0 {
        debug!(flagged, "records with invalid data were flagged");
    }
    info!(records = records.len(), "data file read");
    Ok(records)
}

/// Builds a record, turning invalid and missing required values into
/// messages.
fn flag_invalid(
    schema: &Arc<Schema>,
    line: usize,
    mut values: Vec<Option<String>>,
) -> std::result::Result<Record, DataError> {
    if values.len() != schema.column_count() {
        return Err(DataError::FieldCount {
            line,
            expected: schema.column_count(),
            actual: values.len(),
        });
    }

    let mut invalid = Vec::new();
    for (column, value) in schema.columns().zip(values.iter_mut()) {
        if let Some(raw) = value.take_if(|v| !column.accepts(v)) {
            invalid.push((column.index, column.kind, raw));
        }
    }

    let mut record = Record::new(Arc::clone(schema), line, values)?;
    for (index, kind, raw) in invalid {
        let message_kind = match kind {
            DataKind::Boolean => UNPARSEABLE_BOOLEAN,
            DataKind::Numeric | DataKind::String => UNPARSEABLE_NUMBER,
        };
        let message = record
            .column_message(message_kind, &[index], Flag::Bad)?
            .with_field_value(raw);
        record.add_message(message)?;
    }
    for index in record.missing_required() {
        let message = record.column_message(MISSING_VALUE, &[index], Flag::Fatal)?;
        record.add_message(message)?;
    }
    Ok(record)
}
