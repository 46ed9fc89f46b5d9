//! Zipped spreadsheet (.xlsx) - calamine reader, rust_xlsxwriter writer

use super::cell::{is_populated, text_at};
use super::{resolve_sheet, validate_sheet_name, CodecOptions};
use crate::error::{CodecError, CodecResult};
use crate::types::{Column, Table};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;
use tracing::{info, warn};

pub fn sheet_names(path: &Path) -> CodecResult<Vec<String>> {
    let workbook: Xlsx<_> = open_workbook(path)?;
    Ok(workbook.sheet_names().to_vec())
}

pub fn read(path: &Path, sheet: Option<&str>, _options: &CodecOptions) -> CodecResult<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let name = resolve_sheet(&workbook.sheet_names(), sheet)?;
    let range = workbook.worksheet_range(&name)?;

    let table = table_from_range(&range);
    info!(
        path = %path.display(),
        sheet = %name,
        columns = table.column_count(),
        rows = table.row_count(),
        "read .xlsx table"
    );
    Ok(table)
}

/// One column per populated cell of row 0; rows 1..=last used row, each
/// value read from the sheet column of its header cell.
fn table_from_range(range: &Range<Data>) -> Table {
    let Some((last_row, last_col)) = range.end() else {
        return Table::default();
    };

    let header_cols: Vec<u32> = (0..=last_col)
        .filter(|&col| is_populated(range, 0, col))
        .collect();
    let mut table = Table::new(
        header_cols
            .iter()
            .map(|&col| Column::new(text_at(range, 0, col)))
            .collect(),
    );

    let mut dropped = 0;
    for row in 1..=last_row {
        dropped += (0..=last_col)
            .filter(|col| !header_cols.contains(col) && is_populated(range, row, *col))
            .count();
        table.push_row(header_cols.iter().map(|&col| text_at(range, row, col)));
    }
    if dropped > 0 {
        warn!(dropped, "cells without a header were dropped");
    }
    table
}

pub fn write(table: &Table, path: &Path, sheet: &str, _options: &CodecOptions) -> CodecResult<()> {
    validate_sheet_name(sheet)?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet)?;

    let width = table.column_count();
    for (col, column) in table.columns.iter().enumerate() {
        write_cell(worksheet, 0, col, &column.name)?;
    }
    for (i, row) in table.rows.iter().enumerate() {
        for (col, value) in row.iter().take(width).enumerate() {
            write_cell(worksheet, i + 1, col, value)?;
        }
    }

    workbook.save(path)?;
    info!(
        path = %path.display(),
        sheet,
        columns = width,
        rows = table.row_count(),
        "wrote .xlsx table"
    );
    Ok(())
}

/// Write one text cell; empty values stay blank
fn write_cell(worksheet: &mut Worksheet, row: usize, col: usize, value: &str) -> CodecResult<()> {
    if value.is_empty() {
        return Ok(());
    }
    let (Ok(row), Ok(col)) = (u32::try_from(row), u16::try_from(col)) else {
        return Err(CodecError::LimitExceeded(format!(
            "cell ({}, {}) is outside the worksheet grid",
            row, col
        )));
    };
    worksheet.write_string(row, col, value)?;
    Ok(())
}
