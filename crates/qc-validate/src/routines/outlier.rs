//! Outliers relative to the population standard deviation of a column.

use std::sync::Arc;

use qc_model::kinds::{field_text, valid_text};
use qc_model::{Flag, Message, MessageKind, Record, Schema};

use super::format_value;
use crate::error::Result;
use crate::params::Params;
use crate::routine::{Routine, RoutineFactory};

pub const NAME: &str = "Outlier";
const USAGE: &str = "<column>,<stdevLimit>";

pub const OUTLIER: MessageKind = MessageKind::new("Outlier", short_text, full_text);

pub const FACTORY: RoutineFactory = RoutineFactory {
    name: NAME,
    description: "Flags values too many standard deviations from the mean",
    usage: USAGE,
    message_kinds: &[OUTLIER],
    initialise,
};

fn short_text(m: &Message) -> String {
    format!("{} standard deviation is too large", m.columns_text())
}

fn full_text(m: &Message) -> String {
    format!(
        "{} is {} standard deviations from the mean - limit is {}",
        m.columns_text(),
        field_text(m),
        valid_text(m)
    )
}

#[derive(Debug)]
pub struct Outlier {
    column: usize,
    stdev_limit: f64,
}

fn initialise(parameters: &[String], schema: &Arc<Schema>) -> Result<Box<dyn Routine>> {
    let params = Params::new(NAME, USAGE, parameters, schema, 2..=2)?;
    Ok(Box::new(Outlier {
        column: params.numeric_column(0)?,
        stdev_limit: params.positive(1, "Standard deviation limit")?,
    }))
}

/// Population mean and standard deviation, computed in a single pass.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    sum_squares: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let n = self.count as f64;
        let delta = value - self.mean;
        self.sum_squares += (n - 1.0) * delta * delta / n;
        self.mean += delta / n;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation. Zero when there are no values.
    pub fn stdev(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.sum_squares / self.count as f64).sqrt()
        }
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = RunningStats::default();
        for value in iter {
            stats.push(value);
        }
        stats
    }
}

impl Routine for Outlier {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&mut self, records: &mut [Record]) -> Result<()> {
        let values = records
            .iter()
            .map(|record| record.number(self.column))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let stats: RunningStats = values
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        let stdev = stats.stdev();
        if stdev <= 0.0 {
            return Ok(());
        }

        for (record, value) in records.iter_mut().zip(values) {
            let Some(value) = value.filter(|v| v.is_finite()) else {
                continue;
            };
            let deviation = (value - stats.mean()).abs();
            if deviation >= self.stdev_limit * stdev {
                let message = record
                    .column_message(OUTLIER, &[self.column], Flag::Bad)?
                    .with_field_value(format_value(deviation / stdev))
                    .with_valid_value(format_value(self.stdev_limit));
                record.add_message(message)?;
            }
        }
        Ok(())
    }
}
