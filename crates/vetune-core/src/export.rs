//! CSV export / import
//!
//! One table row per line, values joined by commas, no header. Values are
//! written with six decimal places.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::table::Table;

/// Errors reading a CSV table
#[allow(missing_docs)]
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Line {line}, column {column}: '{text}' is not a number")]
    InvalidNumber {
        line: usize,
        column: usize,
        text: String,
    },

    #[error("CSV contains no values")]
    Empty,
}

/// Render the table as CSV text
pub fn to_csv(table: &Table) -> String {
    let mut out = String::with_capacity(table.width() * table.height() * 12);
    for row in table.rows() {
        let line: Vec<String> = row.iter().map(|v| format!("{:.6}", v)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// Write the table to a CSV file
pub fn export_csv<P: AsRef<Path>>(table: &Table, path: P) -> io::Result<()> {
    fs::write(path, to_csv(table))
}

/// Parse CSV text into rows of values. Blank lines are skipped.
pub fn parse_csv(text: &str) -> Result<Vec<Vec<f64>>, ImportError> {
    let mut rows = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for (col_idx, field) in line.split(',').enumerate() {
            let field = field.trim();
            let value: f64 = field.parse().map_err(|_| ImportError::InvalidNumber {
                line: line_idx + 1,
                column: col_idx + 1,
                text: field.to_string(),
            })?;
            row.push(value);
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(rows)
}

/// Load CSV text into `table`.
///
/// The text is fully parsed before any cell is written, so a parse error
/// leaves the table untouched. Values are clamped. Rows or columns beyond
/// the table are ignored; cells the CSV does not reach keep their values.
/// Returns the number of cells written.
pub fn import_csv(table: &mut Table, text: &str) -> Result<usize, ImportError> {
    let rows = parse_csv(text)?;

    let mut writes = Vec::new();
    let mut ignored = 0usize;
    for (y, row) in rows.iter().enumerate() {
        for (x, &value) in row.iter().enumerate() {
            if table.in_bounds(x, y) {
                writes.push((x, y, value));
            } else {
                ignored += 1;
            }
        }
    }
    if ignored > 0 {
        tracing::warn!(
            "CSV import ignored {} value(s) outside the {}x{} table",
            ignored,
            table.width(),
            table.height()
        );
    }

    table.commit(&writes);
    tracing::debug!("Imported {} cell(s) into {}", writes.len(), table.metadata.name);
    Ok(writes.len())
}

/// Load a CSV file into `table`
pub fn import_csv_file<P: AsRef<Path>>(table: &mut Table, path: P) -> Result<usize, ImportError> {
    let text = fs::read_to_string(path)?;
    import_csv(table, &text)
}
