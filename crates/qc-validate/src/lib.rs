//! QC routines and the engine that runs them.
//!
//! # Architecture
//!
//! - [`Routine`]: a configured check applied to one record set
//! - [`RoutineRegistry`]: factories for the bundled routines, keyed by name
//! - [`RunList`]: routines and parameters read from a run list file and
//!   validated against a schema
//! - [`QcEngine`]: runs fresh routine instances over a record set, one
//!   routine after another
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use qc_ingest::{DataReadOptions, load_schema, read_records};
//! use qc_validate::{QcEngine, RoutineRegistry, RunList};
//!
//! let schema = load_schema(Path::new("columns.csv"))?;
//! let run_list = RunList::load(Path::new("routines.csv"), &schema, &RoutineRegistry::builtin())?;
//! let mut records = read_records(Path::new("cruise.csv"), &schema, &DataReadOptions::default())?;
//! let report = QcEngine::from_run_list(&run_list)?.run(&mut records);
//! ```

mod engine;
mod error;
mod params;
pub mod position;
mod registry;
mod routine;
pub mod routines;
mod run_list;
pub mod time;

pub use engine::{QcEngine, RoutineOutcome, RunReport};
pub use error::{Result, RoutineError};
pub use registry::RoutineRegistry;
pub use routine::{Initialiser, Routine, RoutineFactory};
pub use run_list::{RunList, RunListEntry};
