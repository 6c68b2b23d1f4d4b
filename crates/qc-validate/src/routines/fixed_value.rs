//! A column whose value must not change within a file.

use std::sync::Arc;

use qc_model::kinds::{field_text, valid_text};
use qc_model::{Flag, Message, MessageKind, Record, Schema};

use crate::error::Result;
use crate::params::Params;
use crate::routine::{Routine, RoutineFactory};

pub const NAME: &str = "FixedValue";
const USAGE: &str = "<column>,<ignoreMissing>";

pub const VALUE_NOT_FIXED: MessageKind = MessageKind::new("ValueNotFixed", short_text, full_text);

pub const FACTORY: RoutineFactory = RoutineFactory {
    name: NAME,
    description: "Flags values that differ from the first value in the file",
    usage: USAGE,
    message_kinds: &[VALUE_NOT_FIXED],
    initialise,
};

fn short_text(m: &Message) -> String {
    format!("{} value should be fixed", m.columns_text())
}

fn full_text(m: &Message) -> String {
    format!(
        "{} value is '{}' - should be fixed as '{}'",
        m.columns_text(),
        field_text(m),
        valid_text(m)
    )
}

#[derive(Debug)]
pub struct FixedValue {
    column: usize,
    ignore_missing: bool,
}

fn initialise(parameters: &[String], schema: &Arc<Schema>) -> Result<Box<dyn Routine>> {
    let params = Params::new(NAME, USAGE, parameters, schema, 2..=2)?;
    Ok(Box::new(FixedValue {
        column: params.column(0)?,
        ignore_missing: params.boolean(1, "ignoreMissing")?,
    }))
}

impl Routine for FixedValue {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&mut self, records: &mut [Record]) -> Result<()> {
        let reference = if self.ignore_missing {
            records
                .iter()
                .position(|record| matches!(record.value(self.column), Ok(Some(_))))
        } else if records.is_empty() {
            None
        } else {
            Some(0)
        };
        let Some(reference) = reference else {
            return Ok(());
        };
        let expected = records[reference].value(self.column)?.map(str::to_string);

        for record in &mut records[reference + 1..] {
            let value = record.value(self.column)?;
            if self.ignore_missing && value.is_none() {
                continue;
            }
            if value != expected.as_deref() {
                let mut message = record.column_message(VALUE_NOT_FIXED, &[self.column], Flag::Bad)?;
                if let Some(expected) = &expected {
                    message = message.with_valid_value(expected.as_str());
                }
                record.add_message(message)?;
            }
        }
        Ok(())
    }
}
