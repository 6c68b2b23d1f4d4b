//! Parsing of raw field values and configuration tokens.

/// Value used by some instruments to mark a missing numeric reading.
pub const MISSING_VALUE_SENTINEL: f64 = -99999.9;

/// Parses a boolean token.
///
/// Accepts `true/false`, `yes/no`, `y/n`, `t/f` and `1/0`, case-insensitive.
pub fn parse_boolean(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "t" | "1" => Some(true),
        "false" | "no" | "n" | "f" | "0" => Some(false),
        _ => None,
    }
}

/// Returns true if the value parses as a floating point number.
pub fn is_numeric(value: &str) -> bool {
    parse_number(value).is_some()
}

/// Parses a numeric value, ignoring surrounding whitespace.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// Returns true for absent or whitespace-only values.
pub fn is_empty(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
