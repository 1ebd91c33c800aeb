//! Report presentation.
//!
//! Every report renders through the same two paths: a fixed-width text
//! table on stdout (the default) or pretty-printed JSON of the raw summary
//! rows. Columns are declared per report; a report may also inject a
//! formatting override to reshape individual cells without owning the
//! renderer.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde_json::Value;

use crate::pipeline::Summary;
use crate::utils::format::format_number;

/// Printed instead of a table when a report produced no rows.
pub const NO_DATA: &str = "No data to display";

static NULL: Value = Value::Null;

/// Cell alignment within a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// One table column: the summary field it reads, its header label, and how
/// a value becomes cell text.
#[derive(Clone, Copy)]
pub struct Column {
    pub field: &'static str,
    pub header: &'static str,
    pub align: Align,
    pub formatter: fn(&Value) -> String,
}

/// Nested rows rendered beneath each parent row.
///
/// `field` names the parent field holding the child array. Children are
/// indented and use their own column set; widths are computed across every
/// nested block so the blocks line up.
#[derive(Clone, Copy)]
pub struct SubTable {
    pub field: &'static str,
    pub columns: &'static [Column],
    pub indent: usize,
}

/// Per-report cell hook. Returning `None` falls back to the column's own
/// formatter. Passed explicitly by the caller, never discovered globally.
pub type FormatOverride<'a> = &'a dyn Fn(&str, &Value) -> Option<String>;

/// Renders rows as table lines: header, separator, one line per row (plus
/// indented child lines when `sub` is given). Pure; printing and styling
/// happen in [`print_table`].
pub fn table_lines(
    rows: &[Summary],
    columns: &[Column],
    sub: Option<&SubTable>,
    overrides: Option<FormatOverride>,
) -> Vec<String> {
    if rows.is_empty() {
        return vec![NO_DATA.to_string()];
    }

    let main_cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| format_row(row, columns, overrides))
        .collect();
    let main_widths = column_widths(columns, &main_cells);

    let sub_widths = sub.map(|sub| {
        let all_children: Vec<Vec<String>> = rows
            .iter()
            .flat_map(|row| child_rows(row, sub.field))
            .map(|child| format_row(child, sub.columns, overrides))
            .collect();
        column_widths(sub.columns, &all_children)
    });

    let headers: Vec<String> = columns
        .iter()
        .map(|column| column.header.to_string())
        .collect();

    let mut lines = vec![
        pad_line(&headers, columns, &main_widths, 0),
        "-".repeat(line_width(&main_widths)),
    ];

    for (row, cells) in rows.iter().zip(&main_cells) {
        lines.push(pad_line(cells, columns, &main_widths, 0));
        if let (Some(sub), Some(widths)) = (sub, sub_widths.as_ref()) {
            for child in child_rows(row, sub.field) {
                let child_cells = format_row(child, sub.columns, overrides);
                lines.push(pad_line(&child_cells, sub.columns, widths, sub.indent));
            }
        }
    }

    lines
}

/// Prints the table to stdout with a bolded header row.
pub fn print_table(
    rows: &[Summary],
    columns: &[Column],
    sub: Option<&SubTable>,
    overrides: Option<FormatOverride>,
) {
    let lines = table_lines(rows, columns, sub, overrides);
    for (i, line) in lines.iter().enumerate() {
        if i == 0 && !rows.is_empty() {
            println!("{}", line.bold());
        } else {
            println!("{line}");
        }
    }
}

/// Prints the raw summary rows as pretty JSON. An empty report prints `[]`.
pub fn print_json(rows: &[Summary]) -> Result<()> {
    let json = serde_json::to_string_pretty(rows).context("Failed to serialize report to JSON")?;
    println!("{json}");
    Ok(())
}

/// Dispatches on the `--format` flag value.
pub fn render(
    rows: &[Summary],
    columns: &[Column],
    sub: Option<&SubTable>,
    overrides: Option<FormatOverride>,
    format: &str,
) -> Result<()> {
    match format.to_lowercase().as_str() {
        "table" => {
            print_table(rows, columns, sub, overrides);
            Ok(())
        }
        "json" => print_json(rows),
        _ => {
            anyhow::bail!("Invalid format '{}'. Use 'table' or 'json'", format);
        }
    }
}

/// Plain text: strings pass through, null is blank, anything else prints
/// as its JSON form.
pub fn fmt_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Thousands-separated integer counts.
pub fn fmt_count(value: &Value) -> String {
    match value.as_u64() {
        Some(n) => format_number(n as usize),
        None => fmt_text(value),
    }
}

/// Two-decimal averages.
pub fn fmt_avg(value: &Value) -> String {
    match value.as_f64() {
        Some(n) => format!("{n:.2}"),
        None => fmt_text(value),
    }
}

/// Nanoseconds rendered as two-decimal milliseconds. EPT-style log columns
/// such as DB_TOTAL_TIME are recorded in nanoseconds.
pub fn fmt_nanos_ms(value: &Value) -> String {
    match value.as_f64() {
        Some(n) => format!("{:.2}", n / 1_000_000.0),
        None => fmt_text(value),
    }
}

fn format_row(row: &Summary, columns: &[Column], overrides: Option<FormatOverride>) -> Vec<String> {
    columns
        .iter()
        .map(|column| {
            let value = row.get(column.field).unwrap_or(&NULL);
            overrides
                .and_then(|hook| hook(column.field, value))
                .unwrap_or_else(|| (column.formatter)(value))
        })
        .collect()
}

fn child_rows<'a>(row: &'a Summary, field: &str) -> Vec<&'a Summary> {
    row.get(field)
        .and_then(Value::as_array)
        .map(|children| children.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default()
}

fn column_widths(columns: &[Column], cells: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = columns
        .iter()
        .map(|column| column.header.chars().count())
        .collect();
    for row in cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

fn line_width(widths: &[usize]) -> usize {
    let gaps = widths.len().saturating_sub(1) * 2;
    widths.iter().sum::<usize>() + gaps
}

fn pad_line(cells: &[String], columns: &[Column], widths: &[usize], indent: usize) -> String {
    let mut line = " ".repeat(indent);
    for (i, ((cell, column), width)) in cells
        .iter()
        .zip(columns)
        .zip(widths.iter().copied())
        .enumerate()
    {
        if i > 0 {
            line.push_str("  ");
        }
        match column.align {
            Align::Left => line.push_str(&format!("{cell:<width$}")),
            Align::Right => line.push_str(&format!("{cell:>width$}")),
        }
    }
    line.trim_end().to_string()
}
