//! Terminal tables printed after each command.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use rayen_core::classify::AnamnesisAnalysis;
use rayen_core::sheet::MergeStats;

use crate::commands::{AgeSummary, ExtractOutcome, FillOutcome};

/// Sheet row number shown to users: 1-based, after the header row.
fn sheet_row(index: usize) -> usize {
    index + 2
}

pub fn print_extraction(outcome: &ExtractOutcome) {
    let report = &outcome.report;
    println!("Output: {}", outcome.output.display());

    let mut table = Table::new();
    table.set_header(vec![header_cell("Date"), header_cell("Patients")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for date in &report.dates_processed {
        let count = report
            .records
            .iter()
            .filter(|record| record.visit_date() == Some(*date))
            .count();
        table.add_row(vec![Cell::new(date.format("%d-%m-%Y")), Cell::new(count)]);
    }
    for date in &report.dates_unavailable {
        table.add_row(vec![
            Cell::new(date.format("%d-%m-%Y")),
            Cell::new("unavailable").fg(Color::Yellow),
        ]);
    }
    table.add_row(vec![
        total_cell("TOTAL"),
        total_cell(report.records.len()),
    ]);
    println!("{table}");

    if report.rows_skipped > 0 {
        println!("Rows skipped: {}", report.rows_skipped);
    }
}

pub fn print_fill(outcome: &FillOutcome) {
    let report = &outcome.report;
    println!("Output: {}", outcome.output.display());
    println!("{}", merge_table(&outcome.stats));

    let mut table = Table::new();
    table.set_header(vec![header_cell("Row"), header_cell("Issue")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for &row in &report.patients_not_found {
        table.add_row(vec![
            Cell::new(sheet_row(row)),
            Cell::new("patient not found").fg(Color::Yellow),
        ]);
    }
    for (row, reason) in &report.anamnesis_skipped {
        table.add_row(vec![Cell::new(sheet_row(*row)), Cell::new(reason)]);
    }
    for &row in &report.failed {
        table.add_row(vec![
            Cell::new(sheet_row(row)),
            Cell::new("portal error").fg(Color::Red),
        ]);
    }

    println!(
        "Rows: {}, analyzed: {}, without RUN: {}",
        report.rows, report.analyzed, report.rows_without_run
    );
    if table.row_count() > 0 {
        println!("{table}");
    }
}

/// Cells written per column.
pub fn merge_table(stats: &MergeStats) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Column"), header_cell("Cells written")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (column, count) in stats.iter() {
        let count_cell = if count == 0 {
            Cell::new(count).add_attribute(Attribute::Dim)
        } else {
            Cell::new(count).fg(Color::Green)
        };
        table.add_row(vec![Cell::new(column), count_cell]);
    }
    table.add_row(vec![total_cell("TOTAL"), total_cell(stats.total())]);
    table
}

pub fn print_analysis(analysis: &AnamnesisAnalysis) {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.add_row(vec![
        header_cell("Attention type"),
        optional_cell(analysis.attention_type.map(|t| t.label())),
    ]);
    table.add_row(vec![
        header_cell("Deficit"),
        optional_cell(analysis.deficit.map(|d| d.label())),
    ]);
    println!("{table}");
}

pub fn print_age(summary: &AgeSummary) {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.add_row(vec![header_cell("Months"), Cell::new(summary.months)]);
    table.add_row(vec![
        header_cell("Age group"),
        optional_cell(summary.bucket.map(|b| b.label())),
    ]);
    table.add_row(vec![
        header_cell("LME"),
        Cell::new(if summary.lme { "yes" } else { "no" }),
    ]);
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn total_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string())
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => Cell::new("-").add_attribute(Attribute::Dim),
    }
}
