//! Record timestamps.
//!
//! A time spec names either one column holding a full date-time, or a date
//! column and a time column written as `date|time`.

use chrono::{DateTime, NaiveDateTime, Utc};
use qc_model::{Record, Schema};

/// Naive layouts tried after RFC 3339. Naive values are taken as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Columns that make up a record's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpec {
    DateTime(usize),
    DateAndTime { date: usize, time: usize },
}

impl TimeSpec {
    /// Resolves a `column` or `date|time` spec against the schema.
    pub fn parse(spec: &str, schema: &Schema) -> Result<Self, String> {
        let column = |name: &str| -> Result<usize, String> {
            let name = name.trim();
            schema
                .column_index(name)
                .ok_or_else(|| format!("Column '{name}' does not exist"))
        };

        match spec.split_once('|') {
            None => Ok(TimeSpec::DateTime(column(spec)?)),
            Some((date, time)) => Ok(TimeSpec::DateAndTime {
                date: column(date)?,
                time: column(time)?,
            }),
        }
    }

    /// 1-based indices of the spec's columns.
    pub fn columns(&self) -> Vec<usize> {
        match *self {
            TimeSpec::DateTime(index) => vec![index],
            TimeSpec::DateAndTime { date, time } => vec![date, time],
        }
    }

    /// The raw timestamp text of a record, or `None` if any part is missing.
    pub fn text(&self, record: &Record) -> Option<String> {
        match *self {
            TimeSpec::DateTime(index) => record.value(index).ok()?.map(str::to_string),
            TimeSpec::DateAndTime { date, time } => {
                let date = record.value(date).ok()??;
                let time = record.value(time).ok()??;
                Some(format!("{date} {time}"))
            }
        }
    }

    /// The record's timestamp, or `None` if it is missing or unparseable.
    pub fn time_of(&self, record: &Record) -> Option<DateTime<Utc>> {
        self.text(record).and_then(|text| parse_date_time(&text))
    }
}

/// Parses a date-time in one of the accepted layouts.
pub fn parse_date_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Elapsed seconds from `from` to `to`, with millisecond precision.
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_date_time_layouts() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        for value in [
            "2024-03-01T12:30:00Z",
            "2024-03-01T13:30:00+01:00",
            "2024-03-01T12:30:00",
            "2024-03-01 12:30:00.000",
            "2024-03-01T12:30",
            "2024-03-01 12:30",
        ] {
            assert_eq!(parse_date_time(value), Some(expected), "{value}");
        }
        assert_eq!(parse_date_time("01/03/2024"), None);
    }

    #[test]
    fn test_seconds_between() {
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 3, 1, 0, 1, 30).unwrap();
        assert_eq!(seconds_between(from, to), 90.0);
        assert_eq!(seconds_between(to, from), -90.0);
    }
}
