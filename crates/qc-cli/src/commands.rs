use anyhow::{Context, Result};
use comfy_table::Table;
use qc_cli::check::{CheckResult, CheckSettings, run_check};
use qc_cli::config::{RunConfig, delimiter_byte};
use qc_cli::output::write_qc_file;
use qc_ingest::{DataReadOptions, InvalidDataPolicy};
use qc_model::{MessageKind, rebuild};
use qc_validate::RoutineRegistry;
use tracing::info;

use crate::cli::{CheckArgs, DecodeArgs, InvalidDataArg};
use crate::summary::{apply_table_style, print_decoded};

pub fn run_check_command(args: &CheckArgs) -> Result<CheckResult> {
    let config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };

    let schema = args
        .schema
        .clone()
        .or(config.files.schema.clone())
        .context("no schema file given (use --schema or [files] schema)")?;
    let routines = args
        .routines
        .clone()
        .or(config.files.routines.clone())
        .context("no routine file given (use --routines or [files] routines)")?;

    let mut read_options = DataReadOptions::default();
    config.apply_data(&mut read_options)?;
    if args.no_header {
        read_options.has_header = false;
    }
    if let Some(delimiter) = args.delimiter {
        read_options.delimiter = delimiter_byte(delimiter)?;
    }
    if let Some(policy) = args.invalid_data {
        read_options.invalid_data = match policy {
            InvalidDataArg::Abort => InvalidDataPolicy::Abort,
            InvalidDataArg::Flag => InvalidDataPolicy::Flag,
        };
    }

    let settings = CheckSettings {
        schema,
        routines,
        data_files: args.data_files.clone(),
        read_options,
    };
    let result = run_check(&settings, &RoutineRegistry::builtin())?;

    if let Some(dir) = &args.codes_dir {
        for file in &result.files {
            let path = write_qc_file(file, &result.schema, dir)?;
            info!(path = %path.display(), "QC file written");
        }
    }
    Ok(result)
}

pub fn run_routines() -> Result<()> {
    let registry = RoutineRegistry::builtin();
    let mut table = Table::new();
    table.set_header(vec!["Routine", "Parameters", "Messages", "Description"]);
    apply_table_style(&mut table);
    for factory in registry.factories() {
        let kinds: Vec<&str> = factory.message_kinds.iter().map(MessageKind::id).collect();
        table.add_row(vec![
            factory.name.to_string(),
            factory.usage.to_string(),
            kinds.join(", "),
            factory.description.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Prints decoded messages. Returns false if any code could not be decoded.
pub fn run_decode(args: &DecodeArgs) -> Result<bool> {
    let registry = RoutineRegistry::builtin()
        .message_registry()
        .context("build message registry")?;
    let decoded: Vec<_> = args
        .codes
        .iter()
        .flat_map(|codes| rebuild::decode_all(codes, &registry))
        .collect();
    let all_decoded = decoded.iter().all(Result::is_ok);
    print_decoded(&decoded);
    Ok(all_decoded)
}
