//! Readers for QC input files.
//!
//! - **Configuration lines**: comment-aware, comma-separated lines shared by
//!   schema files and routine lists
//! - **Schema files**: `name,kind,required[,cascadeSpec]`
//! - **Data files**: delimited records checked against a schema
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use qc_ingest::{DataReadOptions, load_schema, read_records};
//!
//! let schema = load_schema(Path::new("columns.csv"))?;
//! let records = read_records(Path::new("cruise.csv"), &schema, &DataReadOptions::default())?;
//! ```

mod data;
mod error;
mod lines;
mod schema;

// === Error Types ===
pub use error::{IngestError, Result};

// === Configuration Lines ===
pub use lines::{COMMENT_PREFIXES, ConfigLine, parse_config_lines, read_config_lines};

// === Schema Files ===
pub use schema::{load_schema, parse_schema};

// === Data Files ===
pub use data::{DataReadOptions, InvalidDataPolicy, parse_records, read_records};
