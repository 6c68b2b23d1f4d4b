//! Run configuration (`qc.toml`).
//!
//! ```toml
//! [files]
//! schema = "columns.csv"
//! routines = "routines.csv"
//!
//! [data]
//! has_header = true
//! delimiter = ","
//! invalid_data = "flag"
//! ```
//!
//! Relative paths resolve against the directory holding the file. Every
//! value is optional; command line arguments take precedence.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use qc_ingest::{DataReadOptions, InvalidDataPolicy};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub files: FilesConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilesConfig {
    pub schema: Option<PathBuf>,
    pub routines: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    pub has_header: Option<bool>,
    pub delimiter: Option<char>,
    pub invalid_data: Option<InvalidDataPolicy>,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&text, base).with_context(|| format!("parse config file {}", path.display()))
    }

    /// Parses TOML text, resolving relative paths against `base`.
    pub fn parse(text: &str, base: &Path) -> Result<Self> {
        let mut config: RunConfig = toml::from_str(text)?;
        for path in [&mut config.files.schema, &mut config.files.routines]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        if let Some(delimiter) = config.data.delimiter {
            delimiter_byte(delimiter)?;
        }
        Ok(config)
    }

    /// Applies the `[data]` values over `options`.
    pub fn apply_data(&self, options: &mut DataReadOptions) -> Result<()> {
        if let Some(has_header) = self.data.has_header {
            options.has_header = has_header;
        }
        if let Some(delimiter) = self.data.delimiter {
            options.delimiter = delimiter_byte(delimiter)?;
        }
        if let Some(policy) = self.data.invalid_data {
            options.invalid_data = policy;
        }
        Ok(())
    }
}

/// Data file delimiters must be single ASCII characters.
pub fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("delimiter '{delimiter}' is not an ASCII character");
    }
    Ok(delimiter as u8)
}
