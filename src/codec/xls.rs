//! Legacy binary workbook (.xls)
//!
//! Reading goes through calamine. Writing builds a BIFF8 `Workbook` stream
//! (see [`super::biff`]) and stores it in a fresh compound file. Every
//! written value is text, including the header row.

use super::biff::{self, BOF_WORKBOOK_GLOBALS, BOF_WORKSHEET, DEFAULT_CELL_XF};
use super::cell::{is_populated, populated_from, text_at};
use super::compound;
use super::{resolve_sheet, validate_sheet_name, CodecOptions};
use crate::error::{CodecError, CodecResult};
use crate::types::{Column, Table};
use calamine::{open_workbook, Data, Range, Reader, Xls};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

pub fn sheet_names(path: &Path) -> CodecResult<Vec<String>> {
    let workbook: Xls<_> = open_workbook(path)?;
    Ok(workbook.sheet_names().to_vec())
}

pub fn read(path: &Path, sheet: Option<&str>, _options: &CodecOptions) -> CodecResult<Table> {
    let mut workbook: Xls<_> = open_workbook(path)?;
    let name = resolve_sheet(&workbook.sheet_names(), sheet)?;
    let range = workbook.worksheet_range(&name)?;

    let table = table_from_range(&range);
    info!(
        path = %path.display(),
        sheet = %name,
        columns = table.column_count(),
        rows = table.row_count(),
        "read .xls table"
    );
    Ok(table)
}

/// Header from row 0 up to its last populated cell; every later row that
/// holds at least one value becomes a table row.
fn table_from_range(range: &Range<Data>) -> Table {
    let Some((last_row, last_col)) = range.end() else {
        return Table::default();
    };

    let width = (0..=last_col)
        .rev()
        .find(|&col| is_populated(range, 0, col))
        .map_or(0, |col| col + 1);
    let mut table = Table::new(
        (0..width)
            .map(|col| Column::new(text_at(range, 0, col)))
            .collect(),
    );

    let mut dropped = 0;
    for row in 1..=last_row {
        if populated_from(range, row, 0) == 0 {
            continue;
        }
        dropped += populated_from(range, row, width);
        table.push_row((0..width).map(|col| text_at(range, row, col)));
    }
    if dropped > 0 {
        warn!(dropped, "cells beyond the header width were dropped");
    }
    table
}

pub fn write(table: &Table, path: &Path, sheet: &str, _options: &CodecOptions) -> CodecResult<()> {
    validate_sheet_name(sheet)?;
    let stream = workbook_stream(table, sheet)?;

    let mut out = BufWriter::new(File::create(path)?);
    compound::write_single_stream(&mut out, "Workbook", &stream)?;
    out.flush()?;

    info!(
        path = %path.display(),
        sheet,
        columns = table.column_count(),
        rows = table.row_count(),
        "wrote .xls table"
    );
    Ok(())
}

/// Build the BIFF8 `Workbook` stream for a single sheet
fn workbook_stream(table: &Table, sheet: &str) -> CodecResult<Vec<u8>> {
    let width = table.column_count();
    if width > biff::MAX_COLUMNS {
        return Err(CodecError::LimitExceeded(format!(
            "{} columns exceed the .xls limit of {}",
            width,
            biff::MAX_COLUMNS
        )));
    }
    if table.row_count() + 1 > biff::MAX_ROWS {
        return Err(CodecError::LimitExceeded(format!(
            "{} rows (plus header) exceed the .xls limit of {}",
            table.row_count(),
            biff::MAX_ROWS
        )));
    }

    let header: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    let body = table
        .rows
        .iter()
        .map(|row| row.iter().take(width).map(String::as_str).collect::<Vec<_>>());

    // Shared string table; empty values are left as missing cells
    let mut strings: Vec<String> = Vec::new();
    let mut lookup: HashMap<&str, u32> = HashMap::new();
    let mut cells: Vec<(u16, u16, u32)> = Vec::new();
    for (row, values) in std::iter::once(header).chain(body).enumerate() {
        for (col, value) in values.into_iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let index = *lookup.entry(value).or_insert_with(|| {
                strings.push(value.to_string());
                (strings.len() - 1) as u32
            });
            cells.push((row as u16, col as u16, index));
        }
    }

    let mut stream = Vec::new();
    biff::write_bof(&mut stream, BOF_WORKBOOK_GLOBALS)?;
    biff::write_codepage(&mut stream)?;
    biff::write_window1(&mut stream)?;
    biff::write_default_font(&mut stream)?;
    biff::write_default_xfs(&mut stream)?;
    biff::write_normal_style(&mut stream)?;
    let position_field = biff::write_boundsheet(&mut stream, sheet)?;
    biff::write_sst(&mut stream, &strings, cells.len() as u32)?;
    biff::write_eof(&mut stream)?;

    let sheet_offset = stream.len() as u32;
    stream[position_field..position_field + 4].copy_from_slice(&sheet_offset.to_le_bytes());

    biff::write_bof(&mut stream, BOF_WORKSHEET)?;
    biff::write_dimensions(&mut stream, (table.row_count() + 1) as u32, width as u16)?;
    biff::write_window2(&mut stream)?;
    for (row, col, index) in cells {
        biff::write_labelsst(&mut stream, row, col, DEFAULT_CELL_XF, index)?;
    }
    biff::write_eof(&mut stream)?;

    Ok(stream)
}
