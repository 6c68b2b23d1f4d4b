//! Column schema and cascade rules.
//!
//! A [`Schema`] is built once from an ordered list of [`ColumnEntry`] values
//! and is immutable afterwards. Construction runs in two phases: every entry
//! is validated and assigned its 1-based index first, then cascade specs are
//! resolved, since a cascade may name a column declared further down.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::flag::Flag;
use crate::value::{is_numeric, parse_boolean};

/// Characters that can never appear in a column name.
///
/// These are the separators used by cascade specs and rebuild codes.
pub const RESERVED_NAME_CHARS: [char; 3] = ['_', '|', ';'];

/// Separator between cascade groups.
pub const CASCADE_GROUP_SEPARATOR: char = ';';

/// Separator inside a cascade group.
pub const CASCADE_FIELD_SEPARATOR: char = '|';

/// The kind of value stored in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKind {
    String,
    Numeric,
    Boolean,
}

impl DataKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DataKind::String => "string",
            DataKind::Numeric => "numeric",
            DataKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DataKind {
    type Err = String;

    /// Parses a schema-file kind code (`S`, `N` or `B`, case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(DataKind::String),
            "N" => Ok(DataKind::Numeric),
            "B" => Ok(DataKind::Boolean),
            _ => Err(format!("Unrecognised data type '{s}' - must be S, N or B")),
        }
    }
}

/// One unvalidated line of a schema source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnEntry {
    /// Line in the schema source, used for error reporting.
    pub line: usize,
    pub name: String,
    pub kind: String,
    pub required: String,
    pub cascade: Option<String>,
}

impl ColumnEntry {
    pub fn new(
        line: usize,
        name: impl Into<String>,
        kind: impl Into<String>,
        required: impl Into<String>,
    ) -> Self {
        Self {
            line,
            name: name.into(),
            kind: kind.into(),
            required: required.into(),
            cascade: None,
        }
    }

    #[must_use]
    pub fn with_cascade(mut self, cascade: impl Into<String>) -> Self {
        let cascade = cascade.into();
        self.cascade = if cascade.trim().is_empty() {
            None
        } else {
            Some(cascade)
        };
        self
    }
}

/// Raises a destination column's flag when the source column becomes
/// Questionable or Bad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeRule {
    pub destination: String,
    /// 1-based index of the destination column.
    pub destination_index: usize,
    pub questionable_flag: Flag,
    pub bad_flag: Flag,
}

impl CascadeRule {
    /// The flag to apply to the destination for a new source flag.
    ///
    /// Only Questionable and Bad cascade.
    pub fn flag_for(&self, source: Flag) -> Option<Flag> {
        match source {
            Flag::Questionable => Some(self.questionable_flag),
            Flag::Bad => Some(self.bad_flag),
            _ => None,
        }
    }
}

/// Schema for a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    /// 1-based position in the record.
    pub index: usize,
    pub kind: DataKind,
    pub required: bool,
    pub cascades: Vec<CascadeRule>,
}

impl ColumnSchema {
    /// Returns true if a present value matches the column's data kind.
    pub fn accepts(&self, value: &str) -> bool {
        match self.kind {
            DataKind::String => true,
            DataKind::Numeric => is_numeric(value),
            DataKind::Boolean => parse_boolean(value).is_some(),
        }
    }
}

/// The validated, immutable column layout for a data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    origin: String,
    columns: Vec<ColumnSchema>,
    by_name: HashMap<String, usize>,
}

impl Schema {
    /// Validates the entries and resolves their cascades.
    ///
    /// Any failure aborts the whole build; no partial schema is returned.
    pub fn from_entries(
        origin: impl Into<String>,
        entries: &[ColumnEntry],
    ) -> Result<Self, ConfigError> {
        let origin = origin.into();
        let mut columns = Vec::with_capacity(entries.len());
        let mut by_name = HashMap::with_capacity(entries.len());

        for entry in entries {
            let column = validate_entry(&origin, entry, columns.len() + 1)?;
            if by_name.contains_key(&column.name) {
                return Err(ConfigError::new(&origin, "Column is configured more than once")
                    .at_line(entry.line)
                    .for_column(&column.name));
            }
            by_name.insert(column.name.clone(), column.index);
            columns.push(column);
        }

        if columns.is_empty() {
            return Err(ConfigError::new(&origin, "No columns are configured"));
        }

        for (column, entry) in columns.iter_mut().zip(entries) {
            if let Some(spec) = &entry.cascade {
                column.cascades = parse_cascades(&origin, entry, spec, &by_name)?;
            }
        }

        Ok(Self {
            origin,
            columns,
            by_name,
        })
    }

    /// Where the schema was loaded from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter()
    }

    /// Column at a 1-based index.
    pub fn column(&self, index: usize) -> Option<&ColumnSchema> {
        index.checked_sub(1).and_then(|i| self.columns.get(i))
    }

    /// Column with the given name. Case-sensitive.
    pub fn column_by_name(&self, name: &str) -> Option<&ColumnSchema> {
        self.column_index(name).and_then(|index| self.column(index))
    }

    /// 1-based index of the named column. Case-sensitive.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Case-sensitive, consistent with [`Schema::column_index`].
    pub fn has_column(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.column(index).map(|c| c.name.as_str())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

fn validate_entry(
    origin: &str,
    entry: &ColumnEntry,
    index: usize,
) -> Result<ColumnSchema, ConfigError> {
    let name = entry.name.trim();
    let error = |reason: String| {
        let err = ConfigError::new(origin, reason).at_line(entry.line);
        if name.is_empty() {
            err
        } else {
            err.for_column(name)
        }
    };

    if name.is_empty() {
        return Err(error("Column name is empty".to_string()));
    }
    if let Some(c) = name.chars().find(|c| RESERVED_NAME_CHARS.contains(c)) {
        return Err(error(format!("Column names cannot contain the '{c}' character")));
    }

    let kind = entry.kind.parse::<DataKind>().map_err(error)?;
    let required = parse_boolean(&entry.required).ok_or_else(|| {
        error(format!(
            "Required flag '{}' is not a recognised boolean value",
            entry.required
        ))
    })?;

    Ok(ColumnSchema {
        name: name.to_string(),
        index,
        kind,
        required,
        cascades: Vec::new(),
    })
}

fn parse_cascades(
    origin: &str,
    entry: &ColumnEntry,
    spec: &str,
    by_name: &HashMap<String, usize>,
) -> Result<Vec<CascadeRule>, ConfigError> {
    let error = |reason: String| {
        ConfigError::new(origin, reason)
            .at_line(entry.line)
            .for_column(entry.name.trim())
    };

    let mut rules = Vec::new();
    for group in spec
        .split(CASCADE_GROUP_SEPARATOR)
        .map(str::trim)
        .filter(|g| !g.is_empty())
    {
        let parts: Vec<&str> = group.split(CASCADE_FIELD_SEPARATOR).map(str::trim).collect();
        let [destination, questionable, bad] = parts.as_slice() else {
            return Err(error(format!(
                "Invalid cascade '{group}' - expected column|questionableFlag|badFlag"
            )));
        };

        let destination_index = by_name.get(*destination).copied().ok_or_else(|| {
            error(format!("Cascade refers to a non-existent column '{destination}'"))
        })?;

        rules.push(CascadeRule {
            destination: (*destination).to_string(),
            destination_index,
            questionable_flag: parse_cascade_flag(questionable).map_err(&error)?,
            bad_flag: parse_cascade_flag(bad).map_err(&error)?,
        });
    }
    Ok(rules)
}

fn parse_cascade_flag(value: &str) -> Result<Flag, String> {
    let number = value
        .parse::<i32>()
        .map_err(|_| format!("Invalid cascade flag '{value}'"))?;
    Flag::from_value(number).map_err(|_| format!("Invalid cascade flag '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_kind_codes() {
        assert_eq!("S".parse::<DataKind>().unwrap(), DataKind::String);
        assert_eq!(" B ".parse::<DataKind>().unwrap(), DataKind::Boolean);
        assert_eq!("n".parse::<DataKind>().unwrap(), DataKind::Numeric);
        assert!("X".parse::<DataKind>().is_err());
    }

    #[test]
    fn test_cascade_flag_for_source() {
        let rule = CascadeRule {
            destination: "B".to_string(),
            destination_index: 2,
            questionable_flag: Flag::Bad,
            bad_flag: Flag::Fatal,
        };
        assert_eq!(rule.flag_for(Flag::Questionable), Some(Flag::Bad));
        assert_eq!(rule.flag_for(Flag::Bad), Some(Flag::Fatal));
        assert_eq!(rule.flag_for(Flag::Fatal), None);
        assert_eq!(rule.flag_for(Flag::Good), None);
    }

    #[test]
    fn test_cascade_flag_must_be_numeric() {
        assert_eq!(parse_cascade_flag("44").unwrap(), Flag::Fatal);
        assert!(parse_cascade_flag("Bad").is_err());
        assert!(parse_cascade_flag("5").is_err());
    }
}
