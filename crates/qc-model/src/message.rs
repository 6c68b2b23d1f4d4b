//! QC messages attached to records.
//!
//! A [`Message`] is a plain envelope. The text it renders to is decided by
//! its [`MessageKind`], a small table entry of template functions keyed by a
//! stable identifier. The identifier is what rebuild codes and summaries use.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::flag::Flag;

/// Renders one of a message's texts.
pub type TextTemplate = fn(&Message) -> String;

/// Identity and text templates for one kind of message.
///
/// Two kinds are equal when their identifiers are equal.
#[derive(Clone, Copy)]
pub struct MessageKind {
    id: &'static str,
    short: TextTemplate,
    full: TextTemplate,
}

impl MessageKind {
    pub const fn new(id: &'static str, short: TextTemplate, full: TextTemplate) -> Self {
        Self { id, short, full }
    }

    /// Stable identifier written to rebuild codes.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Returns true if both kinds render text with the same templates.
    pub fn same_templates(&self, other: &MessageKind) -> bool {
        std::ptr::fn_addr_eq(self.short, other.short) && std::ptr::fn_addr_eq(self.full, other.full)
    }
}

impl fmt::Debug for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageKind").field(&self.id).finish()
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id)
    }
}

impl PartialEq for MessageKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageKind {}

impl Hash for MessageKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for MessageKind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MessageKind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(other.id)
    }
}

impl Serialize for MessageKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id)
    }
}

/// A diagnostic explaining why a flag was raised on one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    kind: MessageKind,
    line_number: usize,
    column_indices: BTreeSet<usize>,
    column_names: BTreeSet<String>,
    flag: Flag,
    field_value: Option<String>,
    valid_value: Option<String>,
}

impl Message {
    /// Creates a message for the given `(index, name)` columns.
    pub fn new<I, S>(kind: MessageKind, line_number: usize, columns: I, flag: Flag) -> Self
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        let (column_indices, column_names): (BTreeSet<usize>, BTreeSet<String>) = columns
            .into_iter()
            .map(|(index, name)| (index, name.into()))
            .unzip();
        Self {
            kind,
            line_number,
            column_indices,
            column_names: named(column_names),
            flag,
            field_value: None,
            valid_value: None,
        }
    }

    /// Builds a message from already separated parts, as read from a
    /// rebuild code.
    pub fn from_parts(
        kind: MessageKind,
        line_number: usize,
        column_indices: BTreeSet<usize>,
        column_names: BTreeSet<String>,
        flag: Flag,
        field_value: Option<String>,
        valid_value: Option<String>,
    ) -> Self {
        Self {
            kind,
            line_number,
            column_indices,
            column_names: named(column_names),
            flag,
            field_value: non_empty(field_value),
            valid_value: non_empty(valid_value),
        }
    }

    #[must_use]
    pub fn with_field_value(mut self, value: impl Into<String>) -> Self {
        self.field_value = non_empty(Some(value.into()));
        self
    }

    /// Sets the "valid value" hint shown next to the offending value.
    #[must_use]
    pub fn with_valid_value(mut self, value: impl Into<String>) -> Self {
        self.valid_value = non_empty(Some(value.into()));
        self
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn column_indices(&self) -> &BTreeSet<usize> {
        &self.column_indices
    }

    pub fn column_names(&self) -> &BTreeSet<String> {
        &self.column_names
    }

    pub fn flag(&self) -> Flag {
        self.flag
    }

    pub fn field_value(&self) -> Option<&str> {
        self.field_value.as_deref()
    }

    pub fn valid_value(&self) -> Option<&str> {
        self.valid_value.as_deref()
    }

    /// Column names joined for display.
    pub fn columns_text(&self) -> String {
        self.column_names
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn short_text(&self) -> String {
        (self.kind.short)(self)
    }

    pub fn full_text(&self) -> String {
        (self.kind.full)(self)
    }

    pub fn key(&self) -> MessageKey {
        MessageKey {
            kind: self.kind.id,
            columns: self.column_indices.clone(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: [{}] {}", self.line_number, self.flag, self.full_text())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Empty names cannot be written to a rebuild code, so they are dropped.
fn named(mut names: BTreeSet<String>) -> BTreeSet<String> {
    names.retain(|name| !name.is_empty());
    names
}

/// Groups messages describing the same problem: same kind, same columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MessageKey {
    pub kind: &'static str,
    pub columns: BTreeSet<usize>,
}

/// Count of messages sharing one [`MessageKey`].
///
/// Only Questionable and Bad instances are counted per flag; `instances`
/// counts every message in the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageSummary {
    pub key: MessageKey,
    /// Short text of the first message in the group.
    pub message: String,
    pub questionable_count: usize,
    pub bad_count: usize,
    pub instances: usize,
}

impl MessageSummary {
    /// Groups messages by key, in order of first appearance.
    pub fn summarize<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Vec<MessageSummary> {
        let mut summaries: Vec<MessageSummary> = Vec::new();
        for message in messages {
            let key = message.key();
            let position = match summaries.iter().position(|s| s.key == key) {
                Some(position) => position,
                None => {
                    summaries.push(MessageSummary {
                        key,
                        message: message.short_text(),
                        questionable_count: 0,
                        bad_count: 0,
                        instances: 0,
                    });
                    summaries.len() - 1
                }
            };
            let summary = &mut summaries[position];
            summary.instances += 1;
            match message.flag() {
                Flag::Questionable => summary.questionable_count += 1,
                Flag::Bad => summary.bad_count += 1,
                _ => {}
            }
        }
        summaries
    }
}
