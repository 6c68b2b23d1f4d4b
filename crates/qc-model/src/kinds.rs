//! Message kinds raised while reading data, before any routine runs.

use crate::message::{Message, MessageKind};

pub const MISSING_VALUE: MessageKind =
    MessageKind::new("MissingValue", missing_value_short, missing_value_full);

pub const UNPARSEABLE_NUMBER: MessageKind = MessageKind::new(
    "UnparseableNumber",
    unparseable_number_short,
    unparseable_number_full,
);

pub const UNPARSEABLE_BOOLEAN: MessageKind = MessageKind::new(
    "UnparseableBoolean",
    unparseable_boolean_short,
    unparseable_boolean_full,
);

pub const UNPARSEABLE_DATE: MessageKind =
    MessageKind::new("UnparseableDate", unparseable_date_short, unparseable_date_full);

pub const MISSING_DATE_TIME_ELEMENT: MessageKind = MessageKind::new(
    "MissingDateTimeElement",
    missing_date_time_element_short,
    missing_date_time_element_full,
);

/// Kinds every message registry starts with.
pub const BUILTIN_KINDS: &[MessageKind] = &[
    MISSING_VALUE,
    UNPARSEABLE_NUMBER,
    UNPARSEABLE_BOOLEAN,
    UNPARSEABLE_DATE,
    MISSING_DATE_TIME_ELEMENT,
];

/// The message's field value, or an empty string.
pub fn field_text(message: &Message) -> &str {
    message.field_value().unwrap_or_default()
}

/// The message's valid-value hint, or an empty string.
pub fn valid_text(message: &Message) -> &str {
    message.valid_value().unwrap_or_default()
}

fn missing_value_short(m: &Message) -> String {
    format!("{} missing", m.columns_text())
}

fn missing_value_full(m: &Message) -> String {
    format!(
        "Missing value for column '{}' on line {}",
        m.columns_text(),
        m.line_number()
    )
}

fn unparseable_number_short(m: &Message) -> String {
    format!("Non-numeric value in column '{}'", m.columns_text())
}

fn unparseable_number_full(m: &Message) -> String {
    format!(
        "The value '{}' in column '{}' could not be parsed - it should be numeric",
        field_text(m),
        m.columns_text()
    )
}

fn unparseable_boolean_short(m: &Message) -> String {
    format!("Non-boolean value in column '{}'", m.columns_text())
}

fn unparseable_boolean_full(m: &Message) -> String {
    format!(
        "The value '{}' in column '{}' could not be parsed - it should be a boolean",
        field_text(m),
        m.columns_text()
    )
}

fn unparseable_date_short(_: &Message) -> String {
    "Unparseable date/time".to_string()
}

fn unparseable_date_full(m: &Message) -> String {
    format!(
        "The date and/or time value '{}' could not be parsed",
        field_text(m)
    )
}

fn missing_date_time_element_short(_: &Message) -> String {
    "One or more date/time elements missing".to_string()
}

fn missing_date_time_element_full(_: &Message) -> String {
    "One or more date/time elements are missing".to_string()
}
