//! Values changing too quickly between consecutive records.

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

pub const NAME: &str = "HighDelta";
const USAGE: &str = "<column>,<maxDeltaPerMinute>,<timeSpec>";

pub const HIGH_DELTA: MessageKind = MessageKind::new("HighDelta", short_text, full_text);

pub const FACTORY: RoutineFactory = RoutineFactory {
    name: NAME,
    description: "Flags values that change faster than a limit per minute",
    usage: USAGE,
    message_kinds: &[HIGH_DELTA],
    initialise,
};

fn short_text(m: &Message) -> String {
    format!("{} changes too quickly", m.columns_text())
}

fn full_text(m: &Message) -> String {
    format!(
        "{} changed by {} per minute - max is {} per minute",
        m.columns_text(),
        field_text(m),
        valid_text(m)
    )
}

#[derive(Debug)]
pub struct HighDelta {
    column: usize,
    max_delta: f64,
    time: TimeSpec,
}

fn initialise(parameters: &[String], schema: &Arc<Schema>) -> Result<Box<dyn Routine>> {
    let params = Params::new(NAME, USAGE, parameters, schema, 3..=3)?;
    Ok(Box::new(HighDelta {
        column: params.numeric_column(0)?,
        max_delta: params.positive(1, "Maximum delta")?,
        time: params.time_spec(2)?,
    }))
}

impl Routine for HighDelta {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&mut self, records: &mut [Record]) -> Result<()> {
        let mut last: Option<(f64, DateTime<Utc>)> = None;

        for record in records.iter_mut() {
            let value = record
                .number(self.column)?
                .filter(|v| *v != MISSING_VALUE_SENTINEL);
            let (Some(value), Some(time)) = (value, self.time.time_of(record)) else {
                continue;
            };

            if let Some((last_value, last_time)) = last {
                let minutes = seconds_between(last_time, time) / 60.0;
                if minutes > 0.0 {
                    let delta = (value - last_value).abs() / minutes;
                    if delta > self.max_delta {
                        let message = record
                            .column_message(HIGH_DELTA, &[self.column], Flag::Bad)?
                            .with_field_value(format_value(delta))
                            .with_valid_value(format_value(self.max_delta));
                        record.add_message(message)?;
                    }
                }
            }
            last = Some((value, time));
        }
        Ok(())
    }
}
