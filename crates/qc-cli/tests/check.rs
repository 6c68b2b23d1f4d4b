//! End-to-end check runs over files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use qc_cli::check::{CheckSettings, run_check};
use qc_cli::config::RunConfig;
use qc_cli::output::write_records;
use qc_ingest::{DataReadOptions, InvalidDataPolicy};
use qc_validate::RoutineRegistry;
use tempfile::TempDir;

const COLUMNS: &str = "\
# underway sea surface temperature
Time,S,y
SST,N,n,SSTFlag|3|4
SSTFlag,S,n
";

const ROUTINES: &str = "\
Monotonic,Bad,Time
RangeCheck,SST,0,30,-2,35
";

const CRUISE: &str = "\
Time,SST,SSTFlag
2024-01-01T00:00:00,20,
2024-01-01T00:10:00,40,
2024-01-01T00:05:00,32,
";

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn settings(dir: &Path, data_files: Vec<PathBuf>) -> CheckSettings {
    CheckSettings {
        schema: write(dir, "columns.csv", COLUMNS),
        routines: write(dir, "routines.csv", ROUTINES),
        data_files,
        read_options: DataReadOptions::default(),
    }
}

#[test]
fn files_are_checked_independently() {
    let dir = TempDir::new().unwrap();
    let first = write(dir.path(), "first.csv", CRUISE);
    let second = write(dir.path(), "second.csv", CRUISE);

    let result = run_check(&settings(dir.path(), vec![first, second]), &RoutineRegistry::builtin())
        .unwrap();

    assert_eq!(result.files.len(), 2);
    assert!(!result.has_errors());
    for file in &result.files {
        assert_eq!(file.records.len(), 3);
        assert_eq!(file.questionable_records(), 0);
        assert_eq!(file.bad_records(), 2);
        assert_eq!(file.run.message_count(), 3);
    }
}

#[test]
fn unreadable_data_file_does_not_stop_the_run() {
    let dir = TempDir::new().unwrap();
    let good = write(dir.path(), "good.csv", CRUISE);
    let bad = write(dir.path(), "bad.csv", "Time,SST,SSTFlag\n2024-01-01T00:00:00,warm,\n");
    let missing = dir.path().join("missing.csv");

    let result = run_check(
        &settings(dir.path(), vec![bad, good, missing]),
        &RoutineRegistry::builtin(),
    )
    .unwrap();

    assert_eq!(result.files.len(), 1);
    assert_eq!(result.failures.len(), 2);
    assert!(result.has_errors());
    assert!(result.failures[0].error.contains("SST"), "{}", result.failures[0].error);
}

#[test]
fn invalid_values_can_be_flagged_instead() {
    let dir = TempDir::new().unwrap();
    let data = write(dir.path(), "cruise.csv", "Time,SST,SSTFlag\n2024-01-01T00:00:00,warm,\n");
    let mut settings = settings(dir.path(), vec![data]);
    settings.read_options.invalid_data = InvalidDataPolicy::Flag;

    let result = run_check(&settings, &RoutineRegistry::builtin()).unwrap();

    let file = &result.files[0];
    assert_eq!(file.bad_records(), 1);
    let summaries = file.message_summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].key.kind, "UnparseableNumber");
}

#[test]
fn broken_run_list_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    let data = write(dir.path(), "cruise.csv", CRUISE);
    let settings = settings(dir.path(), vec![data]);
    fs::write(&settings.routines, "Monotonic,Bad,Time\nSpikeCheck,SST\n").unwrap();

    let err = run_check(&settings, &RoutineRegistry::builtin()).unwrap_err();
    let text = format!("{err:#}");
    assert!(text.contains("load run list"), "{text}");
    assert!(text.contains(":2: Unknown routine 'SpikeCheck'"), "{text}");
}

#[test]
fn qc_output_carries_flags_and_codes() {
    let dir = TempDir::new().unwrap();
    let data = write(dir.path(), "cruise.csv", CRUISE);
    let result = run_check(&settings(dir.path(), vec![data]), &RoutineRegistry::builtin()).unwrap();

    let mut output = Vec::new();
    write_records(&mut output, &result.schema, &result.files[0].records).unwrap();
    insta::assert_snapshot!(String::from_utf8(output).unwrap(), @r"
    Time,SST,SSTFlag,QC_Flag,QC_Message,QC_Codes
    2024-01-01T00:00:00,20,,2,,
    2024-01-01T00:10:00,40,,4,SST is out of range,RangeCheck_3_2_SST_4_40_-2 - 35;
    2024-01-01T00:05:00,32,,4,The date and time are not monotonic; SST is out of range,Monotonic_4_1_Time_4_2024-01-01T00:05:00_;RangeCheck_4_2_SST_3_32_0 - 30;
    ");
}

#[test]
fn config_file_supplies_paths_and_options() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "qc.toml",
        "[files]\nschema = \"columns.csv\"\nroutines = \"routines.csv\"\n\n[data]\ninvalid_data = \"flag\"\n",
    );

    let config = RunConfig::load(&path).unwrap();
    assert_eq!(config.files.schema, Some(dir.path().join("columns.csv")));
    assert_eq!(config.files.routines, Some(dir.path().join("routines.csv")));

    let mut options = DataReadOptions::default();
    config.apply_data(&mut options).unwrap();
    assert_eq!(options.invalid_data, InvalidDataPolicy::Flag);
}
