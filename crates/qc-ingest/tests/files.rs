//! Loading schema and data files from disk.

use std::fs;

use qc_ingest::{
    DataReadOptions, IngestError, InvalidDataPolicy, load_schema, read_config_lines, read_records,
};
use qc_model::{DataError, Flag};
use tempfile::TempDir;

const SCHEMA: &str = "\
# QC schema for underway data
Date,S,y
Time,S,y
SST,N,n,Flags|3|4
// derived columns
Flags,S,n
";

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn schema_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "columns.csv", SCHEMA);

    let schema = load_schema(&path).unwrap();
    assert_eq!(schema.column_names(), vec!["Date", "Time", "SST", "Flags"]);
    assert_eq!(schema.column(3).unwrap().cascades[0].destination_index, 4);
    assert_eq!(schema.origin(), path.display().to_string());
}

#[test]
fn schema_file_with_byte_order_mark() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "columns.csv", &format!("\u{feff}{SCHEMA}"));
    assert_eq!(load_schema(&path).unwrap().column_name(1), Some("Date"));
}

#[test]
fn schema_error_reports_file_line_and_column() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "columns.csv", "Date,S,y\nSST,N,n,Nowhere|3|4\n");

    match load_schema(&path).unwrap_err() {
        IngestError::Config(err) => {
            assert_eq!(err.line, Some(2));
            assert_eq!(err.column.as_deref(), Some("SST"));
            assert!(err.origin.ends_with("columns.csv"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn schema_comment_with_open_quote() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "columns.csv", "# columns,\"see manual\nTime,S,y\nSST,N,n\n");

    let schema = load_schema(&path).unwrap();
    assert_eq!(schema.column_names(), vec!["Time", "SST"]);
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let err = load_schema(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, IngestError::FileRead { .. }));
}

#[test]
fn config_lines_keep_file_line_numbers() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "routines.csv", "! routines\nRangeCheck,SST,0,30,-2,35\n\nOutlier,SST,3\n");
    let lines = read_config_lines(&path).unwrap();
    assert_eq!(lines.iter().map(|l| l.line).collect::<Vec<_>>(), vec![2, 4]);
    assert_eq!(lines[1].fields, vec!["Outlier", "SST", "3"]);
}

#[test]
fn data_file_aborts_on_invalid_value() {
    let dir = TempDir::new().unwrap();
    let schema = load_schema(&write(&dir, "columns.csv", SCHEMA)).unwrap();
    let data = write(
        &dir,
        "cruise.csv",
        "Date,Time,SST,Flags\n2024-03-01,12:00:00,14.2,\n2024-03-01,12:01:00,warm,\n",
    );

    let err = read_records(&data, &schema, &DataReadOptions::default()).unwrap_err();
    match err {
        IngestError::Data { source, .. } => {
            assert!(matches!(
                source,
                DataError::InvalidData {
                    line: 3,
                    index: 3,
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn data_file_aborts_on_missing_required_value() {
    let dir = TempDir::new().unwrap();
    let schema = load_schema(&write(&dir, "columns.csv", SCHEMA)).unwrap();
    let data = write(&dir, "cruise.csv", "Date,Time,SST,Flags\n2024-03-01,,14.2,\n");

    let err = read_records(&data, &schema, &DataReadOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        IngestError::Data {
            source: DataError::MissingRequired { index: 2, .. },
            ..
        }
    ));
}

#[test]
fn data_file_flags_invalid_values_with_cascade() {
    let dir = TempDir::new().unwrap();
    let schema = load_schema(&write(&dir, "columns.csv", SCHEMA)).unwrap();
    let data = write(
        &dir,
        "cruise.tsv",
        "2024-03-01\t12:00:00\twarm\t\n2024-03-01\t12:01:00\t14.3\t\n",
    );
    let options = DataReadOptions {
        has_header: false,
        delimiter: b'\t',
        invalid_data: InvalidDataPolicy::Flag,
    };

    let records = read_records(&data, &schema, &options).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].flag(3).unwrap(), Flag::Bad);
    assert_eq!(records[0].flag(4).unwrap(), Flag::Bad);
    assert_eq!(records[0].message_summaries(), "Non-numeric value in column 'SST'");
    assert!(!records[1].has_messages());
}

#[test]
fn wrong_field_count_aborts_under_both_policies() {
    let dir = TempDir::new().unwrap();
    let schema = load_schema(&write(&dir, "columns.csv", SCHEMA)).unwrap();
    let data = write(&dir, "cruise.csv", "2024-03-01,12:00:00\n");

    for invalid_data in [InvalidDataPolicy::Abort, InvalidDataPolicy::Flag] {
        let options = DataReadOptions {
            has_header: false,
            invalid_data,
            ..DataReadOptions::default()
        };
        let err = read_records(&data, &schema, &options).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Data {
                source: DataError::FieldCount {
                    expected: 4,
                    actual: 2,
                    ..
                },
                ..
            }
        ));
    }
}
