//! Single-table repair passes applied to an extracted feed directory.
//! Each pass reads one table, transforms rows, and rewrites the same
//! file in place with an unchanged column set and order.

pub mod blocks;
pub mod clean;
pub mod routes;
pub mod shapes;

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::feed::write::serialize_table;

/// Read a table file into header + rows. BOM-tolerant; ragged rows are
/// padded or truncated to the header width so transforms can index by
/// column position.
pub fn read_table_file(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let header: Vec<String> = rdr
        .headers()
        .with_context(|| format!("parsing header of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record =
            record.with_context(|| format!("parsing record in {}", path.display()))?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(header.len(), String::new());
        rows.push(row);
    }
    Ok((header, rows))
}

/// Rewrite the table file in place, same header, BOM first.
pub fn write_table_file(path: &Path, header: &[String], rows: &[Vec<String>]) -> Result<()> {
    let bytes = serialize_table(header, rows)
        .with_context(|| format!("serializing {}", path.display()))?;
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

/// Column position by name, if present.
pub fn column_index(header: &[String], name: &str) -> Option<usize> {
    header.iter().position(|c| c == name)
}
