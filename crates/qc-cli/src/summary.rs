use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use qc_cli::check::{CheckResult, FileReport};
use qc_model::{Flag, Message, MessageSummary, RebuildCodeError, Schema};

pub fn print_summary(result: &CheckResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Records"),
        header_cell("Questionable"),
        header_cell("Bad"),
        header_cell("Messages"),
        header_cell("Failed routines"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut total_records = 0usize;
    let mut total_questionable = 0usize;
    let mut total_bad = 0usize;
    let mut total_messages = 0usize;
    for file in &result.files {
        let questionable = file.questionable_records();
        let bad = file.bad_records();
        let messages = file.run.message_count();
        total_records += file.records.len();
        total_questionable += questionable;
        total_bad += bad;
        total_messages += messages;

        let failed: Vec<&str> = file.run.failures().map(|outcome| outcome.routine).collect();
        table.add_row(vec![
            Cell::new(file.path.display()).fg(Color::Blue),
            Cell::new(file.records.len()),
            count_cell(questionable, Color::Yellow),
            count_cell(bad, Color::Red),
            count_cell(messages, Color::White),
            if failed.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(failed.join(", ")).fg(Color::Red)
            },
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_records).add_attribute(Attribute::Bold),
        count_cell(total_questionable, Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(total_bad, Color::Red).add_attribute(Attribute::Bold),
        count_cell(total_messages, Color::White).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");

    for file in &result.files {
        print_message_table(file, &result.schema);
    }
    print_errors(result);
}

fn print_message_table(file: &FileReport, schema: &Schema) {
    let summaries = file.message_summaries();
    if summaries.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Message"),
        header_cell("Columns"),
        header_cell("Questionable"),
        header_cell("Bad"),
        header_cell("Total"),
    ]);
    apply_table_style(&mut table);
    for index in 2..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for summary in &summaries {
        table.add_row(vec![
            Cell::new(&summary.message),
            Cell::new(column_names(summary, schema)),
            count_cell(summary.questionable_count, Color::Yellow),
            count_cell(summary.bad_count, Color::Red),
            Cell::new(summary.instances),
        ]);
    }
    println!();
    println!("{}:", file.path.display());
    println!("{table}");
}

fn print_errors(result: &CheckResult) {
    let routine_errors = result.files.iter().flat_map(|file| {
        file.run.failures().filter_map(move |outcome| {
            outcome
                .error
                .as_ref()
                .map(|error| format!("{}: {error}", file.path.display()))
        })
    });
    let file_errors = result
        .failures
        .iter()
        .map(|failure| format!("{}: {}", failure.path.display(), failure.error));
    let errors: Vec<String> = file_errors.chain(routine_errors).collect();
    if !errors.is_empty() {
        eprintln!("Errors:");
        for error in &errors {
            eprintln!("- {error}");
        }
    }
}

pub fn print_decoded(decoded: &[Result<Message, RebuildCodeError>]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Line"),
        header_cell("Columns"),
        header_cell("Flag"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    let mut errors = Vec::new();
    for entry in decoded {
        match entry {
            Ok(message) => {
                table.add_row(vec![
                    Cell::new(message.line_number()),
                    Cell::new(message.columns_text()),
                    flag_cell(message.flag()),
                    Cell::new(message.full_text()),
                ]);
            }
            Err(err) => errors.push(err),
        }
    }
    if table.row_count() > 0 {
        println!("{table}");
    }
    if !errors.is_empty() {
        eprintln!("Errors:");
        for error in errors {
            eprintln!("- {error}");
        }
    }
}

fn column_names(summary: &MessageSummary, schema: &Schema) -> String {
    let names: Vec<&str> = summary
        .key
        .columns
        .iter()
        .filter_map(|&index| schema.column_name(index))
        .collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn flag_cell(flag: Flag) -> Cell {
    match flag {
        Flag::Fatal => Cell::new(flag).fg(Color::Red).add_attribute(Attribute::Bold),
        Flag::Bad => Cell::new(flag).fg(Color::Red),
        Flag::Questionable => Cell::new(flag).fg(Color::Yellow),
        _ => dim_cell(flag),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
