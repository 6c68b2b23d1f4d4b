//! Records must be in strictly increasing time order.
//!
//! Each record is compared with the last record that passed the check, so a
//! single record with a backwards time does not cause the following records
//! to be flagged as well.

use std::sync::Arc;

use qc_model::{Flag, Message, MessageKind, Record, Schema};
use tracing::trace;

use crate::error::Result;
use crate::params::Params;
use crate::routine::{Routine, RoutineFactory};
use crate::time::TimeSpec;

pub const NAME: &str = "Monotonic";
const USAGE: &str = "<Bad|Fatal>,<timeSpec>";

pub const MONOTONIC: MessageKind = MessageKind::new("Monotonic", not_monotonic, not_monotonic);

pub const MISSING_TIME: MessageKind = MessageKind::new("MissingTime", missing_time, missing_time);

pub const FACTORY: RoutineFactory = RoutineFactory {
    name: NAME,
    description: "Flags records whose time is not after the previous record",
    usage: USAGE,
    message_kinds: &[MONOTONIC, MISSING_TIME],
    initialise,
};

fn not_monotonic(_: &Message) -> String {
    "The date and time are not monotonic".to_string()
}

fn missing_time(_: &Message) -> String {
    "Missing Date/Time".to_string()
}

#[derive(Debug)]
pub struct Monotonic {
    flag: Flag,
    time: TimeSpec,
}

fn initialise(parameters: &[String], schema: &Arc<Schema>) -> Result<Box<dyn Routine>> {
    let params = Params::new(NAME, USAGE, parameters, schema, 2..=2)?;
    let flag = match params.get(0).parse::<Flag>() {
        Ok(flag @ (Flag::Bad | Flag::Fatal)) => flag,
        _ => return Err(params.error("Flag must be Bad or Fatal")),
    };
    Ok(Box::new(Monotonic {
        flag,
        time: params.time_spec(1)?,
    }))
}

impl Routine for Monotonic {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&mut self, records: &mut [Record]) -> Result<()> {
        let columns = self.time.columns();
        let mut last_accepted = None;

        for record in records.iter_mut() {
            let Some(time) = self.time.time_of(record) else {
                let message = record.column_message(MISSING_TIME, &columns, Flag::Fatal)?;
                record.add_message(message)?;
                continue;
            };

            match last_accepted {
                Some(previous) if time <= previous => {
                    trace!(line = record.line_number(), "time is not monotonic");
                    let message = record.column_message(MONOTONIC, &columns, self.flag)?;
                    record.add_message(message)?;
                }
                _ => last_accepted = Some(time),
            }
        }
        Ok(())
    }
}
