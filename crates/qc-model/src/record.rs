//! Records and their fields.
//!
//! Column indices in this API are 1-based, matching the schema. Fields are
//! stored in a flat vector and cascades look their destination up by index,
//! so a field never needs a reference back to its record.

use std::sync::Arc;

use tracing::trace;

use crate::error::{DataError, RebuildCodeError};
use crate::flag::Flag;
use crate::message::{Message, MessageKind};
use crate::rebuild;
use crate::registry::MessageRegistry;
use crate::schema::{ColumnSchema, DataKind, Schema};
use crate::value::{parse_boolean, parse_number};

/// One value of a record, with its current flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    index: usize,
    value: Option<String>,
    flag: Flag,
}

impl Field {
    /// 1-based column index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn flag(&self) -> Flag {
        self.flag
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

/// One line of a data file.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    line_number: usize,
    fields: Vec<Field>,
    messages: Vec<Message>,
}

impl Record {
    /// Builds a record from values in schema order.
    ///
    /// Blank values are stored as absent. Present values must match their
    /// column's data kind.
    pub fn new(
        schema: Arc<Schema>,
        line_number: usize,
        values: Vec<Option<String>>,
    ) -> Result<Self, DataError> {
        if values.len() != schema.column_count() {
            return Err(DataError::FieldCount {
                line: line_number,
                expected: schema.column_count(),
                actual: values.len(),
            });
        }

        let fields = schema
            .columns()
            .zip(values)
            .map(|(column, value)| {
                let value = normalize(value);
                check_kind(column, line_number, value.as_deref())?;
                Ok(Field {
                    index: column.index,
                    value,
                    flag: Flag::Good,
                })
            })
            .collect::<Result<Vec<_>, DataError>>()?;

        Ok(Self {
            schema,
            line_number,
            fields,
            messages: Vec::new(),
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Result<&Field, DataError> {
        index
            .checked_sub(1)
            .and_then(|slot| self.fields.get(slot))
            .ok_or(DataError::NoSuchColumnIndex {
                line: self.line_number,
                index,
            })
    }

    fn field_mut(&mut self, index: usize) -> Result<&mut Field, DataError> {
        let line = self.line_number;
        index
            .checked_sub(1)
            .and_then(|slot| self.fields.get_mut(slot))
            .ok_or(DataError::NoSuchColumnIndex { line, index })
    }

    pub fn value(&self, index: usize) -> Result<Option<&str>, DataError> {
        self.field(index).map(Field::value)
    }

    /// Numeric value of a field, or `None` when it is absent.
    pub fn number(&self, index: usize) -> Result<Option<f64>, DataError> {
        let Some(value) = self.value(index)? else {
            return Ok(None);
        };
        parse_number(value)
            .map(Some)
            .ok_or_else(|| self.invalid_data(index, value, DataKind::Numeric))
    }

    /// Boolean value of a field, or `None` when it is absent.
    pub fn boolean(&self, index: usize) -> Result<Option<bool>, DataError> {
        let Some(value) = self.value(index)? else {
            return Ok(None);
        };
        parse_boolean(value)
            .map(Some)
            .ok_or_else(|| self.invalid_data(index, value, DataKind::Boolean))
    }

    fn invalid_data(&self, index: usize, value: &str, kind: DataKind) -> DataError {
        DataError::InvalidData {
            line: self.line_number,
            column: self.schema.column_name(index).unwrap_or_default().to_string(),
            index,
            value: value.to_string(),
            kind,
        }
    }

    /// 1-based index of a column. Case-sensitive.
    pub fn column_index(&self, name: &str) -> Result<usize, DataError> {
        self.schema
            .column_index(name)
            .ok_or_else(|| DataError::NoSuchColumnName {
                line: self.line_number,
                name: name.to_string(),
            })
    }

    /// Field for a named column. Case-sensitive.
    pub fn column(&self, name: &str) -> Result<&Field, DataError> {
        self.field(self.column_index(name)?)
    }

    /// Case-sensitive, like [`Record::column_index`].
    pub fn column_exists(&self, name: &str) -> bool {
        self.schema.has_column(name)
    }

    pub fn column_name(&self, index: usize) -> Result<&str, DataError> {
        self.schema
            .column_name(index)
            .ok_or(DataError::NoSuchColumnIndex {
                line: self.line_number,
                index,
            })
    }

    /// Replaces a field's value, checking it against the column's data kind.
    ///
    /// The field's flag is left unchanged.
    pub fn set_value(&mut self, index: usize, value: Option<String>) -> Result<(), DataError> {
        let value = normalize(value);
        let line = self.line_number;
        let schema = Arc::clone(&self.schema);
        let column = schema
            .column(index)
            .ok_or(DataError::NoSuchColumnIndex { line, index })?;
        check_kind(column, line, value.as_deref())?;
        self.field_mut(index)?.value = value;
        Ok(())
    }

    pub fn flag(&self, index: usize) -> Result<Flag, DataError> {
        self.field(index).map(Field::flag)
    }

    /// Raises a field's flag.
    ///
    /// Flags that are not more significant than the current one are ignored.
    /// When the new flag is Questionable or Bad the column's cascades are
    /// applied in declaration order. Returns whether the flag changed.
    pub fn set_flag(&mut self, index: usize, flag: Flag) -> Result<bool, DataError> {
        self.field(index)?;
        Ok(self.raise_flag(index, flag))
    }

    fn raise_flag(&mut self, index: usize, flag: Flag) -> bool {
        let Some(field) = index.checked_sub(1).and_then(|slot| self.fields.get_mut(slot)) else {
            return false;
        };
        if !flag.more_significant_than(field.flag) {
            return false;
        }
        field.flag = flag;

        if flag.cascades() {
            let schema = Arc::clone(&self.schema);
            if let Some(column) = schema.column(index) {
                for rule in &column.cascades {
                    if let Some(cascade) = rule.flag_for(flag) {
                        trace!(
                            line = self.line_number,
                            source = %column.name,
                            destination = %rule.destination,
                            flag = %cascade,
                            "cascade"
                        );
                        self.raise_flag(rule.destination_index, cascade);
                    }
                }
            }
        }
        true
    }

    /// Creates a message for the given columns of this record.
    ///
    /// The field value is a snapshot of the columns' values, joined with a
    /// space when there is more than one.
    pub fn column_message(
        &self,
        kind: MessageKind,
        indices: &[usize],
        flag: Flag,
    ) -> Result<Message, DataError> {
        let mut columns = Vec::with_capacity(indices.len());
        let mut values = Vec::new();
        for &index in indices {
            let field = self.field(index)?;
            columns.push((index, self.column_name(index)?.to_string()));
            if let Some(value) = field.value() {
                values.push(value);
            }
        }
        Ok(Message::new(kind, self.line_number, columns, flag).with_field_value(values.join(" ")))
    }

    /// Attaches a message and raises the flag of every column it names.
    ///
    /// All column indices are checked before anything is changed.
    pub fn add_message(&mut self, message: Message) -> Result<(), DataError> {
        for &index in message.column_indices() {
            self.field(index)?;
        }
        let flag = message.flag();
        let indices: Vec<usize> = message.column_indices().iter().copied().collect();
        self.messages.push(message);
        for index in indices {
            self.raise_flag(index, flag);
        }
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Removes every message and resets every flag to Good.
    pub fn clear_messages(&mut self) {
        self.messages.clear();
        for field in &mut self.fields {
            field.flag = Flag::Good;
        }
    }

    /// Replaces the record's messages, re-deriving the flags from them.
    pub fn set_messages(&mut self, messages: Vec<Message>) -> Result<(), DataError> {
        for message in &messages {
            for &index in message.column_indices() {
                self.field(index)?;
            }
        }
        self.clear_messages();
        messages.into_iter().try_for_each(|m| self.add_message(m))
    }

    /// Replaces the record's messages with those decoded from rebuild codes.
    ///
    /// Codes that cannot be decoded are skipped and returned.
    pub fn restore_messages(
        &mut self,
        codes: &str,
        registry: &MessageRegistry,
    ) -> Result<Vec<RebuildCodeError>, DataError> {
        let mut messages = Vec::new();
        let mut errors = Vec::new();
        for decoded in rebuild::decode_all(codes, registry) {
            match decoded {
                Ok(message) => messages.push(message),
                Err(err) => errors.push(err),
            }
        }
        self.set_messages(messages)?;
        Ok(errors)
    }

    /// The record's messages as rebuild codes.
    pub fn rebuild_codes(&self) -> String {
        rebuild::encode_all(&self.messages)
    }

    /// Short texts of the record's messages, without repeats.
    pub fn message_summaries(&self) -> String {
        let mut texts: Vec<String> = Vec::new();
        for message in &self.messages {
            let text = message.short_text();
            if !texts.contains(&text) {
                texts.push(text);
            }
        }
        texts.join("; ")
    }

    /// The most significant flag on any field.
    pub fn worst_flag(&self) -> Flag {
        self.fields
            .iter()
            .map(Field::flag)
            .fold(Flag::Good, Flag::max_significance)
    }

    pub fn has_questionable(&self) -> bool {
        self.fields.iter().any(|f| f.flag == Flag::Questionable)
    }

    /// True when any field is Bad or Fatal.
    pub fn has_bad(&self) -> bool {
        self.fields
            .iter()
            .any(|f| matches!(f.flag, Flag::Bad | Flag::Fatal))
    }

    /// Indices of required columns without a value.
    pub fn missing_required(&self) -> Vec<usize> {
        self.schema
            .columns()
            .filter(|column| column.required)
            .filter(|column| {
                self.field(column.index)
                    .map(Field::is_empty)
                    .unwrap_or(true)
            })
            .map(|column| column.index)
            .collect()
    }

    /// Fails on the first required column without a value.
    pub fn check_required(&self) -> Result<(), DataError> {
        match self.missing_required().first() {
            Some(&index) => Err(DataError::MissingRequired {
                line: self.line_number,
                column: self.schema.column_name(index).unwrap_or_default().to_string(),
                index,
            }),
            None => Ok(()),
        }
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn check_kind(column: &ColumnSchema, line: usize, value: Option<&str>) -> Result<(), DataError> {
    match value {
        Some(value) if !column.accepts(value) => Err(DataError::InvalidData {
            line,
            column: column.name.clone(),
            index: column.index,
            value: value.to_string(),
            kind: column.kind,
        }),
        _ => Ok(()),
    }
}
