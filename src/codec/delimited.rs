//! Delimited text (.csv)
//!
//! Fields are split on the delimiter with quoting disabled: a value that
//! contains the delimiter is indistinguishable from two values, and written
//! values are never quoted or escaped. The first physical line is always the
//! header, even when blank; later blank lines are skipped.

use super::CodecOptions;
use crate::error::{CodecError, CodecResult};
use crate::types::Table;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Delimited text has no sheets
pub fn sheet_names(_path: &Path) -> CodecResult<Vec<String>> {
    Ok(Vec::new())
}

pub fn read(path: &Path, _sheet: Option<&str>, options: &CodecOptions) -> CodecResult<Table> {
    let mut file = BufReader::new(File::open(path)?);
    let delimiter = options.csv.delimiter;

    let mut line = Vec::new();
    if file.read_until(b'\n', &mut line)? == 0 {
        return Err(CodecError::EmptyInput(path.to_path_buf()));
    }
    let header = line.strip_suffix(b"\n").unwrap_or(&line);
    let header = header.strip_suffix(b"\r").unwrap_or(header);
    let header = String::from_utf8_lossy(header);
    let header = header.trim_start_matches(BYTE_ORDER_MARK);
    let mut table = Table::with_columns(header.split(char::from(delimiter)));

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .delimiter(delimiter)
        .from_reader(file);

    let mut dropped = 0;
    for record in reader.byte_records() {
        let record = record?;
        dropped += table.push_row(record.iter().map(|f| String::from_utf8_lossy(f).into_owned()));
    }
    if dropped > 0 {
        warn!(dropped, "fields beyond the header width were dropped");
    }

    info!(
        path = %path.display(),
        columns = table.column_count(),
        rows = table.row_count(),
        "read .csv table"
    );
    Ok(table)
}

pub fn write(table: &Table, path: &Path, _sheet: &str, options: &CodecOptions) -> CodecResult<()> {
    let delimiter = char::from(options.csv.delimiter).to_string();
    let width = table.column_count();

    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", table.column_names().collect::<Vec<_>>().join(delimiter.as_str()))?;
    for row in &table.rows {
        let line = row
            .iter()
            .take(width)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(delimiter.as_str());
        writeln!(out, "{}", line)?;
    }
    out.flush()?;

    info!(
        path = %path.display(),
        columns = width,
        rows = table.row_count(),
        "wrote .csv table"
    );
    Ok(())
}
