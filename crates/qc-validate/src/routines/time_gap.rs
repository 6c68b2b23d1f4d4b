//! Gaps between consecutive measurements.

use std::sync::Arc;

use qc_model::kinds::{field_text, valid_text};
use qc_model::{Flag, Message, MessageKind, Record, Schema};

use super::format_value;
use crate::error::Result;
use crate::params::Params;
use crate::routine::{Routine, RoutineFactory};
use crate::time::{TimeSpec, seconds_between};

pub const NAME: &str = "TimeGap";
const USAGE: &str = "<gapLimitDays>,<timeSpec>";

const SECONDS_PER_DAY: f64 = 86_400.0;

pub const TIME_GAP: MessageKind = MessageKind::new("TimeGap", short_text, full_text);

pub const FACTORY: RoutineFactory = RoutineFactory {
    name: NAME,
    description: "Flags gaps between measurements longer than a number of days",
    usage: USAGE,
    message_kinds: &[TIME_GAP],
    initialise,
};

fn short_text(_: &Message) -> String {
    "Too much time between measurements".to_string()
}

fn full_text(m: &Message) -> String {
    format!(
        "Gap between measurements is {} days - limit is {} days",
        field_text(m),
        valid_text(m)
    )
}

#[derive(Debug)]
pub struct TimeGap {
    gap_limit_days: f64,
    time: TimeSpec,
}

fn initialise(parameters: &[String], schema: &Arc<Schema>) -> Result<Box<dyn Routine>> {
    let params = Params::new(NAME, USAGE, parameters, schema, 2..=2)?;
    Ok(Box::new(TimeGap {
        gap_limit_days: params.positive(0, "Gap limit")?,
        time: params.time_spec(1)?,
    }))
}

impl Routine for TimeGap {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&mut self, records: &mut [Record]) -> Result<()> {
        let columns = self.time.columns();
        let mut last = None;

        for record in records.iter_mut() {
            let Some(time) = self.time.time_of(record) else {
                continue;
            };
            if let Some(previous) = last {
                let gap = seconds_between(previous, time) / SECONDS_PER_DAY;
                if gap > self.gap_limit_days {
                    let message = record
                        .column_message(TIME_GAP, &columns, Flag::Bad)?
                        .with_field_value(format_value(gap))
                        .with_valid_value(format_value(self.gap_limit_days));
                    record.add_message(message)?;
                }
            }
            last = Some(time);
        }
        Ok(())
    }
}
