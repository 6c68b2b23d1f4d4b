//! Rebuild codes: the text form of a [`Message`].
//!
//! A code has seven fields separated by `_`:
//!
//! ```text
//! kind_line_idx1|idx2_name1|name2_flag_fieldValue_validValue;
//! ```
//!
//! Codes for one record are concatenated, each terminated by `;`. Names and
//! values are percent-escaped so that the separators can appear in them.

use std::collections::BTreeSet;

use crate::error::RebuildCodeError;
use crate::flag::Flag;
use crate::message::Message;
use crate::registry::MessageRegistry;

pub const FIELD_SEPARATOR: char = '_';
pub const VALUE_SEPARATOR: char = '|';
pub const CODE_TERMINATOR: char = ';';

const ESCAPES: [(char, &str); 4] = [('%', "%25"), ('_', "%5F"), ('|', "%7C"), (';', "%3B")];

/// Encodes one message, including the trailing terminator.
pub fn encode(message: &Message) -> String {
    let indices = join(message.column_indices().iter().map(ToString::to_string));
    let names = join(message.column_names().iter().map(|name| escape(name)));

    format!(
        "{kind}{sep}{line}{sep}{indices}{sep}{names}{sep}{flag}{sep}{field}{sep}{valid}{CODE_TERMINATOR}",
        kind = message.kind().id(),
        sep = FIELD_SEPARATOR,
        line = message.line_number(),
        flag = message.flag().value(),
        field = escape(message.field_value().unwrap_or_default()),
        valid = escape(message.valid_value().unwrap_or_default()),
    )
}

/// Encodes every message into one string.
pub fn encode_all<'a>(messages: impl IntoIterator<Item = &'a Message>) -> String {
    messages.into_iter().map(encode).collect()
}

/// Decodes a single code. The trailing terminator is optional.
pub fn decode(code: &str, registry: &MessageRegistry) -> Result<Message, RebuildCodeError> {
    let code = code.trim_start();
    let code = code
        .trim_end()
        .strip_suffix(CODE_TERMINATOR)
        .unwrap_or(code);

    let fields: Vec<&str> = code.split(FIELD_SEPARATOR).collect();
    let [kind, line, indices, names, flag, field_value, valid_value] = fields.as_slice() else {
        return Err(RebuildCodeError::FieldCount {
            code: code.to_string(),
            found: fields.len(),
        });
    };

    let kind = registry
        .get(kind)
        .ok_or_else(|| RebuildCodeError::UnknownKind {
            kind: (*kind).to_string(),
        })?;

    let line_number = line
        .parse::<usize>()
        .ok()
        .filter(|line| *line >= 1)
        .ok_or_else(|| RebuildCodeError::InvalidLineNumber {
            value: (*line).to_string(),
        })?;

    let column_indices = split_values(indices)
        .map(|index| {
            index
                .parse::<usize>()
                .map_err(|_| RebuildCodeError::InvalidColumnIndex {
                    value: index.to_string(),
                })
        })
        .collect::<Result<BTreeSet<_>, _>>()?;

    let column_names = split_values(names)
        .map(unescape)
        .collect::<Result<BTreeSet<_>, _>>()?;

    let flag = flag
        .parse::<i32>()
        .ok()
        .and_then(|value| Flag::from_value(value).ok())
        .ok_or_else(|| RebuildCodeError::InvalidFlag {
            value: (*flag).to_string(),
        })?;

    Ok(Message::from_parts(
        kind,
        line_number,
        column_indices,
        column_names,
        flag,
        Some(unescape(field_value)?),
        Some(unescape(valid_value)?),
    ))
}

/// Decodes a string of concatenated codes.
///
/// Each code is decoded independently so one bad code does not hide the
/// others.
pub fn decode_all(codes: &str, registry: &MessageRegistry) -> Vec<Result<Message, RebuildCodeError>> {
    codes
        .split(CODE_TERMINATOR)
        .filter(|code| !code.trim().is_empty())
        .map(|code| decode(code, registry))
        .collect()
}

fn join(values: impl Iterator<Item = String>) -> String {
    values.collect::<Vec<_>>().join(&VALUE_SEPARATOR.to_string())
}

fn split_values(field: &str) -> impl Iterator<Item = &str> {
    field.split(VALUE_SEPARATOR).filter(|value| !value.is_empty())
}

/// Escapes the separator characters and `%`.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match ESCAPES.iter().find(|(raw, _)| *raw == c) {
            Some((_, code)) => escaped.push_str(code),
            None => escaped.push(c),
        }
    }
    escaped
}

/// Reverses [`escape`].
pub fn unescape(value: &str) -> Result<String, RebuildCodeError> {
    let invalid = || RebuildCodeError::InvalidEscape {
        value: value.to_string(),
    };

    let mut result = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(position) = rest.find('%') {
        result.push_str(&rest[..position]);
        let sequence = rest.get(position..position + 3).ok_or_else(invalid)?;
        let (raw, _) = ESCAPES
            .iter()
            .find(|(_, code)| code.eq_ignore_ascii_case(sequence))
            .ok_or_else(invalid)?;
        result.push(*raw);
        rest = &rest[position + 3..];
    }
    result.push_str(rest);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_round_trip() {
        let text = "50% of a_b|c;d";
        let escaped = escape(text);
        assert_eq!(escaped, "50%25 of a%5Fb%7Cc%3Bd");
        assert_eq!(unescape(&escaped).unwrap(), text);
    }

    #[test]
    fn test_unescape_rejects_unknown_sequences() {
        assert!(unescape("%41").is_err());
        assert!(unescape("abc%2").is_err());
        assert_eq!(unescape("%5f").unwrap(), "_");
    }

    #[test]
    fn test_split_values_skips_empty() {
        assert_eq!(split_values("").count(), 0);
        assert_eq!(split_values("1|2").collect::<Vec<_>>(), vec!["1", "2"]);
    }
}
