//! Ship speed between consecutive positions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use qc_model::kinds::{field_text, valid_text};
use qc_model::{Flag, Message, MessageKind, Record, Schema};

use super::format_value;
use crate::error::Result;
use crate::params::Params;
use crate::position::distance_km;
use crate::routine::{Routine, RoutineFactory};
use crate::time::{TimeSpec, seconds_between};

pub const NAME: &str = "ShipSpeed";
const USAGE: &str = "<questionableSpeed>,<badSpeed>,<timeSpec>,<lonColumn>,<latColumn>";

/// Records this close together in time are not speed checked.
const MIN_INTERVAL_SECONDS: f64 = 1.0;

pub const SHIP_SPEED: MessageKind =
    MessageKind::new("ShipSpeed", ship_speed_short, ship_speed_full);

pub const BACKWARDS_TIME: MessageKind =
    MessageKind::new("BackwardsTime", backwards_time_short, backwards_time_full);

pub const FACTORY: RoutineFactory = RoutineFactory {
    name: NAME,
    description: "Flags implausible ship speeds between consecutive positions",
    usage: USAGE,
    message_kinds: &[SHIP_SPEED, BACKWARDS_TIME],
    initialise,
};

fn ship_speed_short(_: &Message) -> String {
    "Ship speed too high".to_string()
}

fn ship_speed_full(m: &Message) -> String {
    format!(
        "Ship speed between this measurement and the last is too high. Was {}km/h, threshold is {}km/h",
        field_text(m),
        valid_text(m)
    )
}

fn backwards_time_short(_: &Message) -> String {
    "Record time goes backwards".to_string()
}

fn backwards_time_full(_: &Message) -> String {
    "This record is either at the same time as or before the previous record".to_string()
}

#[derive(Debug)]
pub struct ShipSpeed {
    questionable_speed: f64,
    bad_speed: f64,
    time: TimeSpec,
    longitude: usize,
    latitude: usize,
}

fn initialise(parameters: &[String], schema: &Arc<Schema>) -> Result<Box<dyn Routine>> {
    let params = Params::new(NAME, USAGE, parameters, schema, 5..=5)?;
    let questionable_speed = params.positive(0, "Questionable speed")?;
    let bad_speed = params.positive(1, "Bad speed")?;
    if bad_speed < questionable_speed {
        return Err(params.error("Bad speed must not be less than questionable speed"));
    }
    Ok(Box::new(ShipSpeed {
        questionable_speed,
        bad_speed,
        time: params.time_spec(2)?,
        longitude: params.numeric_column(3)?,
        latitude: params.numeric_column(4)?,
    }))
}

#[derive(Debug, Clone, Copy)]
struct Fix {
    time: DateTime<Utc>,
    position: (f64, f64),
}

impl ShipSpeed {
    fn fix(&self, record: &Record) -> Result<Option<Fix>> {
        let Some(time) = self.time.time_of(record) else {
            return Ok(None);
        };
        let (Some(lon), Some(lat)) = (record.number(self.longitude)?, record.number(self.latitude)?)
        else {
            return Ok(None);
        };
        Ok(Some(Fix {
            time,
            position: (lon, lat),
        }))
    }

    fn columns(&self) -> Vec<usize> {
        let mut columns = self.time.columns();
        columns.extend([self.longitude, self.latitude]);
        columns
    }

    /// Speed limit exceeded, if any, as `(flag, limit)`.
    fn violation(&self, speed: f64) -> Option<(Flag, f64)> {
        if speed > self.bad_speed {
            Some((Flag::Bad, self.bad_speed))
        } else if speed > self.questionable_speed {
            Some((Flag::Questionable, self.questionable_speed))
        } else {
            None
        }
    }
}

impl Routine for ShipSpeed {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&mut self, records: &mut [Record]) -> Result<()> {
        let time_columns = self.time.columns();
        let speed_columns = self.columns();
        let mut last: Option<Fix> = None;

        for record in records.iter_mut() {
            let Some(fix) = self.fix(record)? else {
                continue;
            };
            let Some(previous) = last else {
                last = Some(fix);
                continue;
            };

            let seconds = seconds_between(previous.time, fix.time);
            if seconds <= 0.0 {
                let message = record.column_message(BACKWARDS_TIME, &time_columns, Flag::Bad)?;
                record.add_message(message)?;
                continue;
            }

            if seconds > MIN_INTERVAL_SECONDS {
                let hours = seconds / 3600.0;
                let speed = distance_km(previous.position, fix.position) / hours;
                if let Some((flag, limit)) = self.violation(speed) {
                    let message = record
                        .column_message(SHIP_SPEED, &speed_columns, flag)?
                        .with_field_value(format_value(speed))
                        .with_valid_value(format_value(limit));
                    record.add_message(message)?;
                }
            }
            last = Some(fix);
        }
        Ok(())
    }
}
