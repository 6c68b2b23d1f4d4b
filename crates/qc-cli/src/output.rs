//! Checked data files written back out with their QC results.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use qc_model::{Record, Schema};

use crate::check::FileReport;

/// Columns appended after the data columns.
pub const QC_COLUMNS: [&str; 3] = ["QC_Flag", "QC_Message", "QC_Codes"];

/// Writes `<stem>.qc.csv` into `dir` and returns its path.
pub fn write_qc_file(report: &FileReport, schema: &Schema, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let stem = report
        .path
        .file_stem()
        .map_or_else(|| "data".into(), |stem| stem.to_string_lossy());
    let path = dir.join(format!("{stem}.qc.csv"));
    let file = fs::File::create(&path).with_context(|| format!("create {}", path.display()))?;
    write_records(file, schema, &report.records)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Writes a header row and one row per record.
pub fn write_records<W: io::Write>(writer: W, schema: &Schema, records: &[Record]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    let mut header = schema.column_names();
    header.extend(QC_COLUMNS);
    writer.write_record(&header)?;

    for record in records {
        let mut row: Vec<String> = record
            .fields()
            .iter()
            .map(|field| field.value().unwrap_or_default().to_string())
            .collect();
        row.push(
            record
                .worst_flag()
                .woce_value()
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        );
        row.push(record.message_summaries());
        row.push(record.rebuild_codes());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
