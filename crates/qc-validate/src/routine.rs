//! The routine contract.
//!
//! A routine is created from its parameters and a schema, then applied to
//! exactly one record set. Routines may keep state between records, so a
//! fresh instance is created for every file.

use std::fmt;
use std::sync::Arc;

use qc_model::{MessageKind, Record, Schema};

use crate::error::Result;

/// A configured QC check.
pub trait Routine: Send {
    /// Name the routine is registered under.
    fn name(&self) -> &'static str;

    /// Checks every record, attaching messages to those that fail.
    ///
    /// Messages already attached before an error are kept.
    fn process(&mut self, records: &mut [Record]) -> Result<()>;
}

/// Validates parameters and builds a routine instance.
pub type Initialiser = fn(&[String], &Arc<Schema>) -> Result<Box<dyn Routine>>;

/// Registry entry describing one kind of routine.
#[derive(Clone, Copy)]
pub struct RoutineFactory {
    pub name: &'static str,
    pub description: &'static str,
    /// Parameter syntax, as written after the routine name in a run list.
    pub usage: &'static str,
    /// Every message kind the routine can raise.
    pub message_kinds: &'static [MessageKind],
    pub initialise: Initialiser,
}

impl RoutineFactory {
    /// Creates a new instance, validating the parameters against the schema.
    pub fn create(&self, parameters: &[String], schema: &Arc<Schema>) -> Result<Box<dyn Routine>> {
        (self.initialise)(parameters, schema)
    }
}

impl fmt::Debug for RoutineFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutineFactory")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .field("message_kinds", &self.message_kinds)
            .finish_non_exhaustive()
    }
}
