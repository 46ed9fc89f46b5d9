//! Binary workbook (.xlsb)
//!
//! Reading goes through calamine with header-row semantics: the first row
//! of the used range names the columns and every value is read as text.
//! Writing produces a minimal single-sheet package of BIFF12 parts
//! (see [`super::biff12`]) without styles or a shared string table.

use super::biff12::{self, record_types, RecordWriter};
use super::cell::text_at;
use super::{resolve_sheet, validate_sheet_name, CodecOptions};
use crate::error::{CodecError, CodecResult};
use crate::types::{Column, Table};
use calamine::{open_workbook, Data, Range, Reader, Xlsb};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Row limit of the BIFF12 grid
const MAX_ROWS: usize = 1_048_576;
/// Column limit of the BIFF12 grid
const MAX_COLUMNS: usize = 16_384;

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\r\n",
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.bin" ContentType="application/vnd.ms-excel.sheet.binary.macroEnabled.main"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.bin" ContentType="application/vnd.ms-excel.worksheet"/>"#,
    r#"</Types>"#,
);

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\r\n",
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.bin"></Relationship>"#,
    r#"</Relationships>"#,
);

const WORKBOOK_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\r\n",
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.bin"></Relationship>"#,
    r#"</Relationships>"#,
);

pub fn sheet_names(path: &Path) -> CodecResult<Vec<String>> {
    let workbook: Xlsb<_> = open_workbook(path)?;
    Ok(workbook.sheet_names().to_vec())
}

pub fn read(path: &Path, sheet: Option<&str>, _options: &CodecOptions) -> CodecResult<Table> {
    let mut workbook: Xlsb<_> = open_workbook(path)?;
    let name = resolve_sheet(&workbook.sheet_names(), sheet)?;
    let range = workbook.worksheet_range(&name)?;

    let table = table_from_range(&range);
    info!(
        path = %path.display(),
        sheet = %name,
        columns = table.column_count(),
        rows = table.row_count(),
        "read .xlsb table"
    );
    Ok(table)
}

/// The first used row is the header; a blank header cell is named `F<n>`
/// after its 1-based position. Every later row of the used range is kept.
fn table_from_range(range: &Range<Data>) -> Table {
    let (Some((first_row, first_col)), Some((last_row, last_col))) = (range.start(), range.end())
    else {
        return Table::default();
    };

    let mut table = Table::new(
        (first_col..=last_col)
            .enumerate()
            .map(|(i, col)| {
                let name = text_at(range, first_row, col);
                if name.is_empty() {
                    Column::new(format!("F{}", i + 1))
                } else {
                    Column::new(name)
                }
            })
            .collect(),
    );

    for row in first_row + 1..=last_row {
        table.push_row((first_col..=last_col).map(|col| text_at(range, row, col)));
    }
    table
}

pub fn write(table: &Table, path: &Path, sheet: &str, _options: &CodecOptions) -> CodecResult<()> {
    validate_sheet_name(sheet)?;
    let width = table.column_count();
    if width > MAX_COLUMNS {
        return Err(CodecError::LimitExceeded(format!(
            "{} columns exceed the .xlsb limit of {}",
            width, MAX_COLUMNS
        )));
    }
    if table.row_count() + 1 > MAX_ROWS {
        return Err(CodecError::LimitExceeded(format!(
            "{} rows (plus header) exceed the .xlsb limit of {}",
            table.row_count(),
            MAX_ROWS
        )));
    }

    let workbook = workbook_part(sheet)?;
    let worksheet = worksheet_part(table)?;

    let mut zip = ZipWriter::new(File::create(path)?);
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes()),
        ("xl/workbook.bin", workbook.as_slice()),
        ("xl/_rels/workbook.bin.rels", WORKBOOK_RELS.as_bytes()),
        ("xl/worksheets/sheet1.bin", worksheet.as_slice()),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(data)?;
    }
    zip.finish()?;

    info!(
        path = %path.display(),
        sheet,
        columns = width,
        rows = table.row_count(),
        "wrote .xlsb table"
    );
    Ok(())
}

/// `xl/workbook.bin`: one sheet bound to relationship rId1
fn workbook_part(sheet: &str) -> CodecResult<Vec<u8>> {
    let mut writer = RecordWriter::new(Vec::new());
    writer.write_record(record_types::BEGIN_BOOK, &[])?;
    biff12::write_workbook_properties(&mut writer)?;
    writer.write_record(record_types::BEGIN_BUNDLE_SHS, &[])?;
    biff12::write_bundle_sheet(&mut writer, 1, "rId1", sheet)?;
    writer.write_record(record_types::END_BUNDLE_SHS, &[])?;
    writer.write_record(record_types::END_BOOK, &[])?;
    Ok(writer.into_inner())
}

/// `xl/worksheets/sheet1.bin`: header row then data rows, text cells only
fn worksheet_part(table: &Table) -> CodecResult<Vec<u8>> {
    let width = table.column_count();
    let header: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    let body = table
        .rows
        .iter()
        .map(|row| row.iter().take(width).map(String::as_str).collect::<Vec<_>>());

    let mut writer = RecordWriter::new(Vec::new());
    writer.write_record(record_types::BEGIN_SHEET, &[])?;
    biff12::write_dimensions(
        &mut writer,
        table.row_count() as u32,
        width.saturating_sub(1) as u32,
    )?;
    writer.write_record(record_types::BEGIN_SHEET_DATA, &[])?;

    let mut blank_rows = 0;
    for (row, values) in std::iter::once(header).chain(body).enumerate() {
        let populated: Vec<(usize, &str)> = values
            .into_iter()
            .enumerate()
            .filter(|(_, value)| !value.is_empty())
            .collect();
        let (Some(&(first, _)), Some(&(last, _))) = (populated.first(), populated.last()) else {
            blank_rows += 1;
            continue;
        };

        biff12::write_row_header(&mut writer, row as u32, Some((first as u32, last as u32)))?;
        for (col, value) in populated {
            biff12::write_string_cell(&mut writer, col as u32, value)?;
        }
    }
    if blank_rows > 0 {
        warn!(blank_rows, "rows without values are stored as blank rows");
    }

    writer.write_record(record_types::END_SHEET_DATA, &[])?;
    writer.write_record(record_types::END_SHEET, &[])?;
    Ok(writer.into_inner())
}
