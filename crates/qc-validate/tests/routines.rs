//! Bundled routines applied to small record sets.

use std::path::Path;
use std::sync::Arc;

use qc_ingest::{DataReadOptions, parse_records, parse_schema};
use qc_model::{Flag, Record, Schema};
use qc_validate::{QcEngine, RoutineRegistry, RunList};

const COLUMNS: &str = "\
Time,S,n
SST,N,n
Lon,N,n
Lat,N,n
Ship,S,n
";

fn schema() -> Arc<Schema> {
    parse_schema(Path::new("columns.csv"), COLUMNS).unwrap()
}

fn records(schema: &Arc<Schema>, data: &str) -> Vec<Record> {
    let options = DataReadOptions {
        has_header: false,
        ..DataReadOptions::default()
    };
    parse_records(Path::new("data.csv"), data, schema, &options).unwrap()
}

/// Runs a single run list line over the data and returns the records.
fn check(routine: &str, data: &str) -> Vec<Record> {
    let schema = schema();
    let run_list = RunList::parse(
        Path::new("routines.csv"),
        routine,
        &schema,
        &RoutineRegistry::builtin(),
    )
    .unwrap();
    let mut records = records(&schema, data);
    let report = QcEngine::from_run_list(&run_list)
        .unwrap()
        .run(&mut records);
    assert!(!report.has_failures(), "{report:?}");
    records
}

fn kinds(record: &Record) -> Vec<&'static str> {
    record.messages().iter().map(|m| m.kind().id()).collect()
}

fn flags(record: &Record) -> Vec<Flag> {
    record.messages().iter().map(|m| m.flag()).collect()
}

#[test]
fn range_check_raises_one_message_for_widest_tier() {
    let records = check(
        "RangeCheck,SST,0,30,-2,35",
        "2024-01-01T00:00:00,40,,,\n2024-01-01T00:01:00,32,,,\n2024-01-01T00:02:00,20,,,\n",
    );

    assert_eq!(flags(&records[0]), vec![Flag::Bad]);
    let message = &records[0].messages()[0];
    assert_eq!(message.column_names().iter().collect::<Vec<_>>(), vec!["SST"]);
    assert_eq!(message.short_text(), "SST is out of range");
    assert_eq!(
        message.full_text(),
        "SST value is 40: should be in the range -2 - 35"
    );
    assert_eq!(records[0].flag(2).unwrap(), Flag::Bad);

    assert_eq!(flags(&records[1]), vec![Flag::Questionable]);
    assert_eq!(records[1].messages()[0].valid_value(), Some("0 - 30"));

    assert!(records[2].messages().is_empty());
}

#[test]
fn range_check_fatal_tier() {
    let records = check(
        "RangeCheck,SST,0,30,-2,35,-5,40",
        "t,50,,,\nt,38,,,\nt,-1,,,\n",
    );
    assert_eq!(flags(&records[0]), vec![Flag::Fatal]);
    assert_eq!(flags(&records[1]), vec![Flag::Bad]);
    assert_eq!(flags(&records[2]), vec![Flag::Questionable]);
}

#[test]
fn outlier_flags_only_the_outlying_value() {
    let records = check("Outlier,SST,2", "t,10,,,\nt,10,,,\nt,10,,,\nt,10,,,\nt,100,,,\n");

    for record in &records[..4] {
        assert!(record.messages().is_empty());
    }
    assert_eq!(kinds(&records[4]), vec!["Outlier"]);
    assert_eq!(flags(&records[4]), vec![Flag::Bad]);
    assert_eq!(
        records[4].messages()[0].full_text(),
        "SST is 2 standard deviations from the mean - limit is 2"
    );
}

#[test]
fn outlier_ignores_missing_values_and_zero_spread() {
    let records = check("Outlier,SST,1", "t,5,,,\nt,,,,\nt,5,,,\n");
    assert!(records.iter().all(|r| r.messages().is_empty()));
}

#[test]
fn monotonic_compares_with_last_accepted_record() {
    let records = check(
        "Monotonic,Bad,Time",
        "\
2024-01-01T12:00:00,,,,
2024-01-01T11:59:59,,,,
2024-01-01T12:00:10,,,,
2024-01-01T12:00:05,,,,
",
    );

    assert!(records[0].messages().is_empty());
    assert_eq!(kinds(&records[1]), vec!["Monotonic"]);
    assert_eq!(flags(&records[1]), vec![Flag::Bad]);
    assert!(records[2].messages().is_empty());
    assert_eq!(kinds(&records[3]), vec!["Monotonic"]);
}

#[test]
fn monotonic_equal_times_and_missing_time() {
    let records = check(
        "Monotonic,Fatal,Time",
        "2024-01-01 12:00,,,,\n2024-01-01 12:00,,,,\n,,,,\n2024-01-01 12:01,,,,\n",
    );

    assert!(records[0].messages().is_empty());
    assert_eq!(flags(&records[1]), vec![Flag::Fatal]);
    assert_eq!(kinds(&records[2]), vec!["MissingTime"]);
    assert_eq!(flags(&records[2]), vec![Flag::Fatal]);
    assert_eq!(records[2].messages()[0].short_text(), "Missing Date/Time");
    assert!(records[3].messages().is_empty());
}

#[test]
fn ship_speed_tiers_and_backwards_time() {
    let records = check(
        "ShipSpeed,20,40,Time,Lon,Lat",
        "\
2024-01-01T00:00:00,,0,0,
2024-01-01T01:00:00,,0,0.1,
2024-01-01T02:00:00,,0,0.35,
2024-01-01T03:00:00,,0,1.35,
2024-01-01T02:30:00,,0,1.35,
2024-01-01T04:00:00,,0,1.35,
",
    );

    assert!(records[0].messages().is_empty());
    assert!(records[1].messages().is_empty());

    assert_eq!(kinds(&records[2]), vec!["ShipSpeed"]);
    assert_eq!(flags(&records[2]), vec![Flag::Questionable]);
    assert_eq!(records[2].messages()[0].valid_value(), Some("20"));

    assert_eq!(kinds(&records[3]), vec!["ShipSpeed"]);
    assert_eq!(flags(&records[3]), vec![Flag::Bad]);
    let names: Vec<_> = records[3].messages()[0].column_names().iter().collect();
    assert_eq!(names, vec!["Lat", "Lon", "Time"]);

    assert_eq!(kinds(&records[4]), vec!["BackwardsTime"]);
    let names: Vec<_> = records[4].messages()[0].column_names().iter().collect();
    assert_eq!(names, vec!["Time"]);

    // Compared with the 03:00 fix, not the backwards one.
    assert!(records[5].messages().is_empty());
}

#[test]
fn ship_speed_skips_records_without_position() {
    let records = check(
        "ShipSpeed,20,40,Time,Lon,Lat",
        "2024-01-01T00:00:00,,0,0,\n2024-01-01T00:30:00,,,,\n2024-01-01T01:00:00,,0,0.1,\n",
    );
    assert!(records.iter().all(|r| r.messages().is_empty()));
}

#[test]
fn constant_value_flags_whole_run() {
    let records = check(
        "ConstantValue,SST,20,Time",
        "\
2024-01-01T00:00:00,5,,,
2024-01-01T00:10:00,5,,,
2024-01-01T00:20:00,5,,,
2024-01-01T00:30:00,5,,,
2024-01-01T00:40:00,6,,,
2024-01-01T01:40:00,6,,,
",
    );

    for record in &records[..4] {
        assert_eq!(kinds(record), vec!["ConstantValue"]);
        assert_eq!(
            record.messages()[0].full_text(),
            "SST is constant for 30 minutes - limit is 20 minutes"
        );
    }
    assert!(records[4].messages().is_empty());
    assert!(records[5].messages().is_empty());
}

#[test]
fn constant_value_runs_are_broken_by_missing_values() {
    let records = check(
        "ConstantValue,SST,20,Time",
        "\
2024-01-01T00:00:00,5,,,
2024-01-01T00:10:00,5,,,
2024-01-01T00:20:00,-99999.9,,,
2024-01-01T00:30:00,5,,,
2024-01-01T00:40:00,,,,
2024-01-01T00:50:00,5,,,
",
    );
    assert!(records.iter().all(|r| r.messages().is_empty()));
}

#[test]
fn high_delta_uses_previous_present_value() {
    let records = check(
        "HighDelta,SST,5,Time",
        "\
2024-01-01T00:00:00,1,,,
2024-01-01T00:01:00,2,,,
2024-01-01T00:02:00,10,,,
2024-01-01T00:03:00,,,,
2024-01-01T00:12:00,20,,,
",
    );

    assert!(records[0].messages().is_empty());
    assert!(records[1].messages().is_empty());
    assert_eq!(kinds(&records[2]), vec!["HighDelta"]);
    assert_eq!(
        records[2].messages()[0].full_text(),
        "SST changed by 8 per minute - max is 5 per minute"
    );
    assert!(records[4].messages().is_empty());
}

#[test]
fn time_gap_flags_long_gaps() {
    let records = check(
        "TimeGap,1,Time",
        "2024-01-01T00:00:00,,,,\n2024-01-01T12:00:00,,,,\n,,,,\n2024-01-04T00:00:00,,,,\n",
    );

    assert!(records[1].messages().is_empty());
    assert!(records[2].messages().is_empty());
    assert_eq!(kinds(&records[3]), vec!["TimeGap"]);
    assert_eq!(
        records[3].messages()[0].full_text(),
        "Gap between measurements is 2.5 days - limit is 1 days"
    );
}

#[test]
fn fixed_value_expects_first_value() {
    let records = check("FixedValue,Ship,false", "t,,,,A\nt,,,,A\nt,,,,B\nt,,,,\n");

    assert!(records[0].messages().is_empty());
    assert!(records[1].messages().is_empty());
    assert_eq!(kinds(&records[2]), vec!["ValueNotFixed"]);
    assert_eq!(
        records[2].messages()[0].full_text(),
        "Ship value is 'B' - should be fixed as 'A'"
    );
    assert_eq!(kinds(&records[3]), vec!["ValueNotFixed"]);
}

#[test]
fn fixed_value_can_ignore_missing() {
    let records = check("FixedValue,Ship,yes", "t,,,,\nt,,,,A\nt,,,,\nt,,,,B\n");

    assert!(records[..3].iter().all(|r| r.messages().is_empty()));
    assert_eq!(records[3].messages()[0].valid_value(), Some("A"));
}
