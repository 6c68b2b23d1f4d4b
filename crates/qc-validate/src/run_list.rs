//! Routine run lists.
//!
//! A run list file holds one routine per line as `name,param1,param2,...`.
//! Every entry is validated against the schema when the list is loaded, but
//! routine instances are only created by [`RunList::instantiate`], once per
//! record set.

use std::path::Path;
use std::sync::Arc;

use qc_ingest::{ConfigLine, parse_config_lines, read_config_lines};
use qc_model::{ConfigError, Schema};
use tracing::{debug, info, info_span};

use crate::error::Result;
use crate::registry::RoutineRegistry;
use crate::routine::{Routine, RoutineFactory};

/// A validated routine and its parameters.
#[derive(Debug, Clone)]
pub struct RunListEntry {
    /// 1-based line in the run list file.
    pub line: usize,
    pub factory: RoutineFactory,
    pub parameters: Vec<String>,
}

impl RunListEntry {
    pub fn name(&self) -> &'static str {
        self.factory.name
    }

    /// Creates a fresh routine instance.
    pub fn create(&self, schema: &Arc<Schema>) -> Result<Box<dyn Routine>> {
        self.factory.create(&self.parameters, schema)
    }
}

/// Ordered routines to run against every record set.
#[derive(Debug, Clone)]
pub struct RunList {
    origin: String,
    schema: Arc<Schema>,
    entries: Vec<RunListEntry>,
}

impl RunList {
    /// Reads and validates a run list file.
    pub fn load(
        path: &Path,
        schema: &Arc<Schema>,
        registry: &RoutineRegistry,
    ) -> qc_ingest::Result<Self> {
        let _span = info_span!("load_run_list", path = %path.display()).entered();
        let lines = read_config_lines(path)?;
        let list = Self::from_lines(&path.display().to_string(), &lines, schema, registry)?;
        info!(routines = list.len(), "run list loaded");
        Ok(list)
    }

    /// Validates a run list held in memory.
    pub fn parse(
        origin: &Path,
        text: &str,
        schema: &Arc<Schema>,
        registry: &RoutineRegistry,
    ) -> qc_ingest::Result<Self> {
        let lines = parse_config_lines(origin, text)?;
        Ok(Self::from_lines(
            &origin.display().to_string(),
            &lines,
            schema,
            registry,
        )?)
    }

    /// Resolves each line to a routine and checks its parameters.
    pub fn from_lines(
        origin: &str,
        lines: &[ConfigLine],
        schema: &Arc<Schema>,
        registry: &RoutineRegistry,
    ) -> std::result::Result<Self, ConfigError> {
        let mut entries = Vec::with_capacity(lines.len());
        for line in lines {
            let name = line.field(0).unwrap_or_default();
            let factory = registry.get(name).copied().ok_or_else(|| {
                ConfigError::new(origin, format!("Unknown routine '{name}'")).at_line(line.line)
            })?;
            let parameters = line.fields.iter().skip(1).cloned().collect::<Vec<_>>();

            factory
                .create(&parameters, schema)
                .map_err(|err| ConfigError::new(origin, err.to_string()).at_line(line.line))?;
            debug!(routine = name, line = line.line, "routine configured");

            entries.push(RunListEntry {
                line: line.line,
                factory,
                parameters,
            });
        }
        Ok(Self {
            origin: origin.to_string(),
            schema: Arc::clone(schema),
            entries,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn entries(&self) -> &[RunListEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fresh routine instances in run order.
    pub fn instantiate(&self) -> Result<Vec<Box<dyn Routine>>> {
        self.entries
            .iter()
            .map(|entry| entry.create(&self.schema))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qc_model::ColumnEntry;

    fn schema() -> Arc<Schema> {
        let entries = [
            ColumnEntry::new(1, "Time", "S", "y"),
            ColumnEntry::new(2, "SST", "N", "n"),
        ];
        Arc::new(Schema::from_entries("columns.csv", &entries).unwrap())
    }

    fn parse(text: &str) -> qc_ingest::Result<RunList> {
        RunList::parse(
            Path::new("routines.csv"),
            text,
            &schema(),
            &RoutineRegistry::builtin(),
        )
    }

    #[test]
    fn test_entries_keep_file_order() {
        let list = parse("# checks\nRangeCheck,SST,0,30,-2,35\n\nMonotonic,Bad,Time\n").unwrap();
        let names: Vec<_> = list.entries().iter().map(RunListEntry::name).collect();
        assert_eq!(names, vec!["RangeCheck", "Monotonic"]);
        assert_eq!(list.entries()[0].line, 2);
        assert_eq!(list.entries()[1].line, 4);
        assert_eq!(list.instantiate().unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_routine() {
        let err = parse("RangeCheck,SST,0,30,-2,35\nRangeChecks,SST\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "routines.csv:2: Unknown routine 'RangeChecks'"
        );
    }

    #[test]
    fn test_bad_parameters_report_line() {
        let err = parse("Outlier,Depth,2\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "routines.csv:1: Outlier: Column 'Depth' does not exist"
        );
    }
}
