//! Comment-aware reader for line-oriented configuration files.

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Prefixes that mark a whole line as a comment.
pub const COMMENT_PREFIXES: [&str; 3] = ["#", "!", "//"];

/// One non-comment line of a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLine {
    /// 1-based line number in the file.
    pub line: usize,
    pub fields: Vec<String>,
}

impl ConfigLine {
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}

/// Reads the non-blank, non-comment lines of a configuration file.
pub fn read_config_lines(path: &Path) -> Result<Vec<ConfigLine>> {
    let text = read_text(path)?;
    parse_config_lines(path, &text)
}

/// Parses configuration lines from text. `origin` is used in errors.
///
/// Comment and blank lines are dropped before any field splitting, so quotes
/// inside a comment never affect the lines after it.
pub fn parse_config_lines(origin: &Path, text: &str) -> Result<Vec<ConfigLine>> {
    let mut lines = Vec::new();
    for (offset, raw) in text.lines().enumerate() {
        let line = offset + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_comment(trimmed) {
            debug!(path = %origin.display(), line, "skipping comment line");
            continue;
        }

        let fields = split_fields(origin, line, raw)?;
        if fields.iter().all(String::is_empty) {
            continue;
        }
        lines.push(ConfigLine { line, fields });
    }
    Ok(lines)
}

fn split_fields(origin: &Path, line: usize, raw: &str) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(raw.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => Ok(record.iter().map(str::to_string).collect()),
        Some(Err(e)) => Err(IngestError::Csv {
            path: origin.to_path_buf(),
            message: format!("line {line}: {e}"),
        }),
        None => Ok(Vec::new()),
    }
}

fn is_comment(field: &str) -> bool {
    COMMENT_PREFIXES.iter().any(|p| field.starts_with(p))
}

/// Reads a whole file as text, dropping a UTF-8 byte order mark.
pub(crate) fn read_text(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<ConfigLine> {
        parse_config_lines(Path::new("test.csv"), text).unwrap()
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let lines = parse("# header\n\n! note\n// note\nA, N ,y\n   \nB,S,n,C|3|4\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line, 5);
        assert_eq!(lines[0].fields, vec!["A", "N", "y"]);
        assert_eq!(lines[1].line, 7);
        assert_eq!(lines[1].field(3), Some("C|3|4"));
    }

    #[test]
    fn test_indented_comment() {
        assert!(parse("   # indented\n").is_empty());
    }

    #[test]
    fn test_quote_in_comment_does_not_swallow_later_lines() {
        let lines = parse("# columns,\"see manual\nTime,S,y\r\n! it's \"quoted\nSST,N,n\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line, 2);
        assert_eq!(lines[0].fields, vec!["Time", "S", "y"]);
        assert_eq!(lines[1].line, 4);
        assert_eq!(lines[1].fields, vec!["SST", "N", "n"]);
    }

    #[test]
    fn test_quoted_field_keeps_separators() {
        let lines = parse("Name,\"a,b\"\n");
        assert_eq!(lines[0].fields, vec!["Name", "a,b"]);
    }
}
