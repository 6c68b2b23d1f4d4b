//! The `check` pipeline: load the schema and run list once, then run fresh
//! routine instances over each data file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use qc_ingest::{DataReadOptions, load_schema, read_records};
use qc_model::{MessageSummary, Record, Schema};
use qc_validate::{QcEngine, RoutineRegistry, RunList, RunReport};
use serde::Serialize;
use tracing::{error, info, info_span, trace};

use crate::logging::redact_value;

/// Inputs of a check run.
#[derive(Debug, Clone)]
pub struct CheckSettings {
    pub schema: PathBuf,
    pub routines: PathBuf,
    pub data_files: Vec<PathBuf>,
    pub read_options: DataReadOptions,
}

/// One data file after QC.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub records: Vec<Record>,
    pub run: RunReport,
}

impl FileReport {
    /// Records whose worst flag is Questionable.
    pub fn questionable_records(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.has_questionable() && !r.has_bad())
            .count()
    }

    /// Records with a Bad or Fatal flag.
    pub fn bad_records(&self) -> usize {
        self.records.iter().filter(|r| r.has_bad()).count()
    }

    pub fn message_summaries(&self) -> Vec<MessageSummary> {
        MessageSummary::summarize(self.records.iter().flat_map(Record::messages))
    }

    pub fn summary(&self) -> FileSummary {
        FileSummary {
            path: self.path.clone(),
            records: self.records.len(),
            questionable: self.questionable_records(),
            bad: self.bad_records(),
            routines: self
                .run
                .outcomes
                .iter()
                .map(|outcome| RoutineSummary {
                    routine: outcome.routine,
                    messages: outcome.messages,
                    error: outcome.error.as_ref().map(ToString::to_string),
                })
                .collect(),
            messages: self.message_summaries(),
        }
    }
}

/// A data file that could not be read.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug)]
pub struct CheckResult {
    pub schema: Arc<Schema>,
    pub files: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl CheckResult {
    /// True if a file could not be read or a routine failed.
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty() || self.files.iter().any(|file| file.run.has_failures())
    }

    pub fn summary(&self) -> CheckSummary {
        CheckSummary {
            files: self.files.iter().map(FileReport::summary).collect(),
            failures: self.failures.clone(),
        }
    }
}

/// Serializable view of a check run, for `--json`.
#[derive(Debug, Serialize)]
pub struct CheckSummary {
    pub files: Vec<FileSummary>,
    pub failures: Vec<FileFailure>,
}

#[derive(Debug, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    pub records: usize,
    pub questionable: usize,
    pub bad: usize,
    pub routines: Vec<RoutineSummary>,
    pub messages: Vec<MessageSummary>,
}

#[derive(Debug, Serialize)]
pub struct RoutineSummary {
    pub routine: &'static str,
    pub messages: usize,
    pub error: Option<String>,
}

/// Runs the configured routines over every data file.
///
/// Schema and run list problems abort the run. A data file that cannot be
/// read is reported as a failure and the remaining files are still checked.
pub fn run_check(settings: &CheckSettings, registry: &RoutineRegistry) -> Result<CheckResult> {
    let schema = load_schema(&settings.schema)
        .with_context(|| format!("load schema {}", settings.schema.display()))?;
    let run_list = RunList::load(&settings.routines, &schema, registry)
        .with_context(|| format!("load run list {}", settings.routines.display()))?;

    let mut files = Vec::with_capacity(settings.data_files.len());
    let mut failures = Vec::new();
    for path in &settings.data_files {
        match check_file(path, &run_list, &settings.read_options) {
            Ok(report) => files.push(report),
            Err(err) => {
                error!(path = %path.display(), error = %format!("{err:#}"), "file not checked");
                failures.push(FileFailure {
                    path: path.clone(),
                    error: format!("{err:#}"),
                });
            }
        }
    }
    Ok(CheckResult {
        schema,
        files,
        failures,
    })
}

fn check_file(path: &Path, run_list: &RunList, options: &DataReadOptions) -> Result<FileReport> {
    let _span = info_span!("file", path = %path.display()).entered();
    let mut records = read_records(path, run_list.schema(), options)?;
    let engine = QcEngine::from_run_list(run_list)?;
    let run = engine.run(&mut records);

    for record in records.iter().filter(|r| r.has_messages()) {
        trace!(
            line = record.line_number(),
            flag = %record.worst_flag(),
            codes = redact_value(&record.rebuild_codes()),
            "record flagged"
        );
    }
    info!(
        records = records.len(),
        messages = run.message_count(),
        "file checked"
    );
    Ok(FileReport {
        path: path.to_path_buf(),
        records,
        run,
    })
}
