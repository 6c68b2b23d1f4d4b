//! Core data model for quality control of tabular measurement data.
//!
//! - [`Flag`]: severity values with a significance order
//! - [`Schema`]: validated column layout with [`CascadeRule`]s
//! - [`Record`]: one data line, its field flags and attached [`Message`]s
//! - [`rebuild`]: lossless text encoding of messages

pub mod error;
pub mod flag;
pub mod kinds;
pub mod message;
pub mod rebuild;
pub mod record;
pub mod registry;
pub mod schema;
pub mod value;

pub use error::{ConfigError, DataError, DuplicateKindError, InvalidFlagError, RebuildCodeError};
pub use flag::Flag;
pub use message::{Message, MessageKey, MessageKind, MessageSummary, TextTemplate};
pub use record::{Field, Record};
pub use registry::MessageRegistry;
pub use schema::{CascadeRule, ColumnEntry, ColumnSchema, DataKind, Schema};
