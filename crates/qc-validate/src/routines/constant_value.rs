//! Values that stay constant for too long.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use qc_model::kinds::{field_text, valid_text};
use qc_model::value::MISSING_VALUE_SENTINEL;
use qc_model::{Flag, Message, MessageKind, Record, Schema};

use super::format_value;
use crate::error::Result;
use crate::params::Params;
use crate::routine::{Routine, RoutineFactory};
use crate::time::{TimeSpec, seconds_between};

pub const NAME: &str = "ConstantValue";
const USAGE: &str = "<column>,<maxMinutes>,<timeSpec>";

/// Shorter runs are never flagged.
const MIN_RUN_LENGTH: usize = 3;

pub const CONSTANT_VALUE: MessageKind = MessageKind::new("ConstantValue", short_text, full_text);

pub const FACTORY: RoutineFactory = RoutineFactory {
    name: NAME,
    description: "Flags runs of identical values lasting longer than a limit",
    usage: USAGE,
    message_kinds: &[CONSTANT_VALUE],
    initialise,
};

fn short_text(m: &Message) -> String {
    format!("{} constant for too long", m.columns_text())
}

fn full_text(m: &Message) -> String {
    format!(
        "{} is constant for {} minutes - limit is {} minutes",
        m.columns_text(),
        field_text(m),
        valid_text(m)
    )
}

#[derive(Debug)]
pub struct ConstantValue {
    column: usize,
    max_minutes: f64,
    time: TimeSpec,
}

fn initialise(parameters: &[String], schema: &Arc<Schema>) -> Result<Box<dyn Routine>> {
    let params = Params::new(NAME, USAGE, parameters, schema, 3..=3)?;
    Ok(Box::new(ConstantValue {
        column: params.numeric_column(0)?,
        max_minutes: params.positive(1, "Maximum duration")?,
        time: params.time_spec(2)?,
    }))
}

/// A run of consecutive records with the same value.
#[derive(Debug)]
struct Run {
    value: f64,
    first: usize,
    last: usize,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ConstantValue {
    /// Runs of at least [`MIN_RUN_LENGTH`] records, as record positions.
    fn runs(&self, records: &[Record]) -> Result<Vec<Run>> {
        let mut runs = Vec::new();
        let mut current: Option<Run> = None;

        for (position, record) in records.iter().enumerate() {
            let value = record
                .number(self.column)?
                .filter(|v| *v != MISSING_VALUE_SENTINEL);
            let time = self.time.time_of(record);

            let (Some(value), Some(time)) = (value, time) else {
                runs.extend(current.take());
                continue;
            };

            match current.as_mut() {
                Some(run) if run.value == value => {
                    run.last = position;
                    run.end = time;
                }
                _ => {
                    runs.extend(current.replace(Run {
                        value,
                        first: position,
                        last: position,
                        start: time,
                        end: time,
                    }));
                }
            }
        }
        runs.extend(current);
        runs.retain(|run| run.last + 1 - run.first >= MIN_RUN_LENGTH);
        Ok(runs)
    }
}

impl Routine for ConstantValue {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&mut self, records: &mut [Record]) -> Result<()> {
        for run in self.runs(records)? {
            let minutes = seconds_between(run.start, run.end) / 60.0;
            if minutes <= self.max_minutes {
                continue;
            }
            for record in &mut records[run.first..=run.last] {
                let message = record
                    .column_message(CONSTANT_VALUE, &[self.column], Flag::Bad)?
                    .with_field_value(format_value(minutes))
                    .with_valid_value(format_value(self.max_minutes));
                record.add_message(message)?;
            }
        }
        Ok(())
    }
}
