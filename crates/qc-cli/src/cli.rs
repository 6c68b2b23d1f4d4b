//! Command line arguments for `qc`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "qc",
    version,
    about = "Run quality control routines over delimited data files",
    long_about = "Run quality control routines over delimited data files.\n\n\
                  Columns are described by a schema file; the checks to run are listed\n\
                  in a routine file, one routine and its parameters per line."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow data values in trace output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check data files against a schema and routine list.
    Check(CheckArgs),

    /// List the available routines.
    Routines,

    /// Print the messages held in rebuild codes.
    Decode(DecodeArgs),
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Data files to check.
    #[arg(value_name = "DATA", required = true)]
    pub data_files: Vec<PathBuf>,

    /// Column schema file (name,kind,required[,cascades]).
    #[arg(long, short = 's', value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Routine list file (routine,param,...).
    #[arg(long, short = 'r', value_name = "PATH")]
    pub routines: Option<PathBuf>,

    /// TOML run configuration.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Data files have no header line.
    #[arg(long = "no-header")]
    pub no_header: bool,

    /// Field delimiter of the data files.
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// What to do with values that do not match their column.
    #[arg(long = "invalid-data", value_enum)]
    pub invalid_data: Option<InvalidDataArg>,

    /// Write `<name>.qc.csv` files with flags and rebuild codes to this directory.
    #[arg(long = "codes", value_name = "DIR")]
    pub codes_dir: Option<PathBuf>,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct DecodeArgs {
    /// Rebuild codes, `;`-terminated.
    #[arg(value_name = "CODES", required = true)]
    pub codes: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum InvalidDataArg {
    Abort,
    Flag,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
