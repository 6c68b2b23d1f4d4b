//! Parameter parsing shared by the bundled routines.

use std::ops::RangeInclusive;

use qc_model::value::{parse_boolean, parse_number};
use qc_model::{DataKind, Schema};

use crate::error::{Result, RoutineError};
use crate::time::TimeSpec;

/// A routine's parameter list, checked against a schema.
pub(crate) struct Params<'a> {
    routine: &'static str,
    values: &'a [String],
    schema: &'a Schema,
}

impl<'a> Params<'a> {
    /// Checks the number of parameters against `count`.
    pub(crate) fn new(
        routine: &'static str,
        usage: &str,
        values: &'a [String],
        schema: &'a Schema,
        count: RangeInclusive<usize>,
    ) -> Result<Self> {
        if !count.contains(&values.len()) {
            return Err(RoutineError::parameters(
                routine,
                format!("Incorrect number of parameters. Must be {usage}"),
            ));
        }
        Ok(Self {
            routine,
            values,
            schema,
        })
    }

    pub(crate) fn error(&self, reason: impl Into<String>) -> RoutineError {
        RoutineError::parameters(self.routine, reason)
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn get(&self, position: usize) -> &'a str {
        self.values.get(position).map_or("", |v| v.trim())
    }

    /// 1-based index of the column named at `position`.
    pub(crate) fn column(&self, position: usize) -> Result<usize> {
        let name = self.get(position);
        self.schema
            .column_index(name)
            .ok_or_else(|| self.error(format!("Column '{name}' does not exist")))
    }

    pub(crate) fn numeric_column(&self, position: usize) -> Result<usize> {
        let index = self.column(position)?;
        match self.schema.column(index) {
            Some(column) if column.kind == DataKind::Numeric => Ok(index),
            _ => Err(self.error(format!("Column '{}' must be numeric", self.get(position)))),
        }
    }

    pub(crate) fn number(&self, position: usize, what: &str) -> Result<f64> {
        parse_number(self.get(position))
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.error(format!("{what} parameter must be numeric")))
    }

    /// A number that must be greater than zero.
    pub(crate) fn positive(&self, position: usize, what: &str) -> Result<f64> {
        let value = self.number(position, what)?;
        if value <= 0.0 {
            return Err(self.error(format!("{what} must be greater than zero")));
        }
        Ok(value)
    }

    pub(crate) fn boolean(&self, position: usize, what: &str) -> Result<bool> {
        parse_boolean(self.get(position))
            .ok_or_else(|| self.error(format!("{what} parameter is not a recognised boolean value")))
    }

    pub(crate) fn time_spec(&self, position: usize) -> Result<TimeSpec> {
        TimeSpec::parse(self.get(position), self.schema).map_err(|reason| self.error(reason))
    }
}
