//! Sequential QC engine.
//!
//! Runs the routines of a run list over one record set, in order. A routine
//! that fails stops working on that record set, but the messages and flags it
//! raised before failing stay in place and the remaining routines still run.

use std::fmt;

use qc_model::Record;
use tracing::{debug, info, info_span, trace, warn};

use crate::error::RoutineError;
use crate::routine::Routine;
use crate::run_list::RunList;

/// What one routine did to a record set.
#[derive(Debug)]
pub struct RoutineOutcome {
    pub routine: &'static str,
    /// Messages added by this routine.
    pub messages: usize,
    pub error: Option<RoutineError>,
}

impl RoutineOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcomes of a run, in run order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<RoutineOutcome>,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &RoutineOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.succeeded())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn message_count(&self) -> usize {
        self.outcomes.iter().map(|outcome| outcome.messages).sum()
    }
}

/// Routine instances bound to a single record set.
pub struct QcEngine {
    routines: Vec<Box<dyn Routine>>,
}

impl fmt::Debug for QcEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QcEngine")
            .field("routines", &self.routine_names())
            .finish()
    }
}

impl QcEngine {
    pub fn new(routines: Vec<Box<dyn Routine>>) -> Self {
        Self { routines }
    }

    /// Creates fresh routine instances from a run list.
    pub fn from_run_list(run_list: &RunList) -> Result<Self, RoutineError> {
        Ok(Self::new(run_list.instantiate()?))
    }

    pub fn routine_names(&self) -> Vec<&'static str> {
        self.routines.iter().map(|routine| routine.name()).collect()
    }

    /// Applies every routine to the records.
    ///
    /// Consumes the engine: routine state must not carry over to another
    /// record set.
    pub fn run(mut self, records: &mut [Record]) -> RunReport {
        let mut report = RunReport::default();

        for routine in &mut self.routines {
            let name = routine.name();
            let _span = info_span!("routine", name).entered();
            info!(records = records.len(), "running routine");

            let before: Vec<usize> = records.iter().map(|r| r.messages().len()).collect();
            let result = routine.process(records);

            let mut messages = 0;
            for (record, &count) in records.iter().zip(&before) {
                for message in record.messages().iter().skip(count) {
                    trace!(line = message.line_number(), %message, "message added");
                    messages += 1;
                }
            }

            match &result {
                Ok(()) => debug!(messages, "routine finished"),
                Err(err) => warn!(error = %err, messages, "routine failed"),
            }

            report.outcomes.push(RoutineOutcome {
                routine: name,
                messages,
                error: result.err(),
            });
        }
        report
    }
}
