//! Nested range check on a numeric column.
//!
//! Up to three inclusive tiers are configured: Questionable inside Bad
//! inside Fatal. The widest violated tier decides the flag, and a record
//! receives at most one message.

use std::sync::Arc;

use qc_model::kinds::{field_text, valid_text};
use qc_model::{Flag, Message, MessageKind, Record, Schema};

use crate::error::Result;
use crate::params::Params;
use crate::routine::{Routine, RoutineFactory};

pub const NAME: &str = "RangeCheck";
const USAGE: &str = "<column>,<qMin>,<qMax>,<bMin>,<bMax>[,<fMin>,<fMax>]";

pub const RANGE_CHECK: MessageKind = MessageKind::new("RangeCheck", short_text, full_text);

pub const FACTORY: RoutineFactory = RoutineFactory {
    name: NAME,
    description: "Flags values outside nested questionable, bad and fatal ranges",
    usage: USAGE,
    message_kinds: &[RANGE_CHECK],
    initialise,
};

fn short_text(m: &Message) -> String {
    format!("{} is out of range", m.columns_text())
}

fn full_text(m: &Message) -> String {
    format!(
        "{} value is {}: should be in the range {}",
        m.columns_text(),
        field_text(m),
        valid_text(m)
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn encloses(self, inner: Range) -> bool {
        self.min <= inner.min && self.max >= inner.max
    }

    fn describe(self) -> String {
        format!("{} - {}", self.min, self.max)
    }
}

#[derive(Debug)]
pub struct RangeCheck {
    column: usize,
    questionable: Option<Range>,
    bad: Option<Range>,
    fatal: Option<Range>,
}

fn initialise(parameters: &[String], schema: &Arc<Schema>) -> Result<Box<dyn Routine>> {
    let params = Params::new(NAME, USAGE, parameters, schema, 5..=7)?;
    if params.len() == 6 {
        return Err(params.error(format!(
            "Incorrect number of parameters. Must be {USAGE}"
        )));
    }

    let column = params.numeric_column(0)?;
    let questionable = range(&params, 1, "Questionable")?;
    let bad = range(&params, 3, "Bad")?;
    let fatal = if params.len() == 7 {
        range(&params, 5, "Fatal")?
    } else {
        None
    };

    if questionable.is_none() && bad.is_none() && fatal.is_none() {
        return Err(params.error("At least one range must be configured"));
    }

    let tiers = [("Questionable", questionable), ("Bad", bad), ("Fatal", fatal)];
    let present: Vec<(&str, Range)> = tiers
        .iter()
        .filter_map(|(name, range)| range.map(|r| (*name, r)))
        .collect();
    for pair in present.windows(2) {
        let [(inner_name, inner), (outer_name, outer)] = pair else {
            continue;
        };
        if !outer.encloses(*inner) {
            return Err(params.error(format!(
                "{outer_name} range must be larger than {} range",
                inner_name.to_lowercase()
            )));
        }
    }

    Ok(Box::new(RangeCheck {
        column,
        questionable,
        bad,
        fatal,
    }))
}

/// Reads a min/max pair. Both empty means the tier is not configured.
fn range(params: &Params<'_>, position: usize, name: &str) -> Result<Option<Range>> {
    if params.get(position).is_empty() && params.get(position + 1).is_empty() {
        return Ok(None);
    }
    let min = params.number(position, &format!("{name} range minimum"))?;
    let max = params.number(position + 1, &format!("{name} range maximum"))?;
    if min > max {
        return Err(params.error(format!(
            "{name} range minimum must not be greater than its maximum"
        )));
    }
    Ok(Some(Range { min, max }))
}

impl RangeCheck {
    /// The widest violated tier, if any.
    fn violation(&self, value: f64) -> Option<(Flag, Range)> {
        [
            (Flag::Fatal, self.fatal),
            (Flag::Bad, self.bad),
            (Flag::Questionable, self.questionable),
        ]
        .into_iter()
        .find_map(|(flag, range)| range.filter(|r| !r.contains(value)).map(|r| (flag, r)))
    }
}

impl Routine for RangeCheck {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&mut self, records: &mut [Record]) -> Result<()> {
        for record in records.iter_mut() {
            let Some(value) = record.number(self.column)? else {
                continue;
            };
            if value.is_nan() {
                continue;
            }
            if let Some((flag, range)) = self.violation(value) {
                let message = record
                    .column_message(RANGE_CHECK, &[self.column], flag)?
                    .with_valid_value(range.describe());
                record.add_message(message)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qc_model::ColumnEntry;

    fn schema() -> Arc<Schema> {
        Arc::new(
            Schema::from_entries(
                "columns.csv",
                &[
                    ColumnEntry::new(1, "SST", "N", "n"),
                    ColumnEntry::new(2, "Name", "S", "n"),
                ],
            )
            .unwrap(),
        )
    }

    fn params(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_tiers_must_nest() {
        let err = initialise(&params(&["SST", "0", "30", "5", "35"]), &schema())
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "RangeCheck: Bad range must be larger than questionable range"
        );
        assert!(initialise(&params(&["SST", "0", "30", "", "", "-5", "20"]), &schema()).is_err());
    }

    #[test]
    fn test_parameter_validation() {
        let schema = schema();
        assert!(initialise(&params(&["Name", "0", "30", "", ""]), &schema).is_err());
        assert!(initialise(&params(&["Missing", "0", "30", "", ""]), &schema).is_err());
        assert!(initialise(&params(&["SST", "", "", "", ""]), &schema).is_err());
        assert!(initialise(&params(&["SST", "0", "", "", ""]), &schema).is_err());
        assert!(initialise(&params(&["SST", "0", "30", "", "", ""]), &schema).is_err());
        assert!(initialise(&params(&["SST", "0", "30", "", ""]), &schema).is_ok());
        assert!(initialise(&params(&["SST", "", "", "", "", "-10", "50"]), &schema).is_ok());
    }

    #[test]
    fn test_widest_violated_tier_wins() {
        let check = RangeCheck {
            column: 1,
            questionable: Some(Range { min: 0.0, max: 30.0 }),
            bad: Some(Range { min: -2.0, max: 35.0 }),
            fatal: Some(Range { min: -10.0, max: 50.0 }),
        };
        assert_eq!(check.violation(20.0), None);
        assert_eq!(check.violation(30.0), None);
        assert_eq!(check.violation(32.0).map(|v| v.0), Some(Flag::Questionable));
        assert_eq!(check.violation(40.0).map(|v| v.0), Some(Flag::Bad));
        assert_eq!(check.violation(-20.0).map(|v| v.0), Some(Flag::Fatal));
    }
}
