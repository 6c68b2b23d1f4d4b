//! Column schema files: `name,kind,required[,cascadeSpec]` per line.

use std::path::Path;
use std::sync::Arc;

use qc_model::{ColumnEntry, ConfigError, Schema};
use tracing::{info, info_span};

use crate::error::Result;
use crate::lines::{ConfigLine, parse_config_lines, read_text};

/// Loads and validates a schema file.
pub fn load_schema(path: &Path) -> Result<Arc<Schema>> {
    let text = read_text(path)?;
    parse_schema(path, &text)
}

/// Parses a schema from text. `origin` is used in errors.
pub fn parse_schema(origin: &Path, text: &str) -> Result<Arc<Schema>> {
    let span = info_span!("load_schema", path = %origin.display());
    let _guard = span.enter();

    let origin_name = origin.display().to_string();
    let entries = parse_config_lines(origin, text)?
        .iter()
        .map(|line| column_entry(&origin_name, line))
        .collect::<std::result::Result<Vec<_>, ConfigError>>()?;

    let schema = Schema::from_entries(origin_name, &entries)?;
    info!(columns = schema.column_count(), "schema loaded");
    Ok(Arc::new(schema))
}

fn column_entry(origin: &str, line: &ConfigLine) -> std::result::Result<ColumnEntry, ConfigError> {
    let error = |reason: &str| {
        let err = ConfigError::new(origin, reason).at_line(line.line);
        match line.field(0).filter(|name| !name.is_empty()) {
            Some(name) => err.for_column(name),
            None => err,
        }
    };

    match line.fields.as_slice() {
        [name, kind, required] => Ok(ColumnEntry::new(line.line, name, kind, required)),
        [name, kind, required, cascade] => {
            Ok(ColumnEntry::new(line.line, name, kind, required).with_cascade(cascade))
        }
        fields if fields.len() < 3 => Err(error("Not enough fields - expected name,kind,required")),
        _ => Err(error("Too many fields - expected name,kind,required[,cascades]")),
    }
}
