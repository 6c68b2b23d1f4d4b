//! Library side of the `qc` command line tool.

pub mod check;
pub mod config;
pub mod logging;
pub mod output;
