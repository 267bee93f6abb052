// src/ingest/table.rs
use std::fmt::Write;

use super::{LoadedFile, RowMatrix};

const RULE_WIDTH: usize = 80;

/// Render a parsed file as a fixed-width text table for console diagnostics.
///
/// Column widths are the widest cell in each header-defined column, capped at
/// `max_width` characters; longer cells are cut, not wrapped.
pub fn render_table(file_name: &str, matrix: &RowMatrix, max_width: usize) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "CSV FILE: {file_name}");
    let _ = writeln!(out, "{rule}");

    if matrix.is_empty() {
        let _ = writeln!(out, "(Empty file)");
        return out;
    }

    let header = matrix.header();
    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            matrix
                .rows()
                .iter()
                .map(|row| row.get(col).map_or(0, |c| c.chars().count()))
                .max()
                .unwrap_or(0)
                .min(max_width)
        })
        .collect();

    let header_line = format_row(header, &widths);
    let _ = writeln!(out, "{header_line}");
    let _ = writeln!(out, "{}", "-".repeat(header_line.chars().count()));

    for row in &matrix.rows()[1..] {
        let _ = writeln!(out, "{}", format_row(row, &widths));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Total rows: {}", matrix.len() - 1);
    let _ = writeln!(out, "{rule}");
    out
}

/// Tables for every loaded file in input order; failed files get a one-line error.
pub fn render_tables(files: &[LoadedFile], max_width: usize) -> String {
    let mut out = String::new();
    for f in files {
        match &f.outcome {
            Ok(m) => out.push_str(&render_table(&f.source, m, max_width)),
            Err(e) => {
                let _ = writeln!(out, "{}: {}", f.source, e);
            }
        }
    }
    out
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    widths
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let cell: String = cells.get(i).map_or(String::new(), |c| c.chars().take(w).collect());
            format!("{cell:<w$}")
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
