//! Table codec tests across every supported format

use pretty_assertions::assert_eq;
use rust_xlsxwriter::{Format as CellFormat, Workbook};
use sheetcodec::{
    read_table, read_table_with, sheet_names, write_table, write_table_with, CodecError,
    CodecOptions, CsvOptions, Format, Table, DEFAULT_SHEET_NAME,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn people() -> Table {
    let mut table = Table::with_columns(["id", "name", "city"]);
    table.push_row(["1", "Ada Lovelace", "London"]);
    table.push_row(["2", "Grace Hopper", "New York"]);
    table.push_row(["3", "Kurt Gödel", "Brno"]);
    table
}

fn path_in(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

// ═══════════════════════════════════════════════════════════════════════════
// ROUND TRIPS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_round_trip_every_format() {
    let dir = TempDir::new().unwrap();
    for format in Format::ALL {
        let path = path_in(&dir, &format!("people.{}", format.extension()));
        write_table(&people(), &path, DEFAULT_SHEET_NAME).unwrap();
        let back = read_table(&path, None).unwrap();
        assert_eq!(back, people(), "round trip through {}", format);
    }
}

#[test]
fn test_header_only_tables() {
    let dir = TempDir::new().unwrap();
    let table = Table::with_columns(["a", "b", "c"]);
    for format in Format::ALL {
        let path = path_in(&dir, &format!("empty.{}", format.extension()));
        write_table(&table, &path, DEFAULT_SHEET_NAME).unwrap();
        let back = read_table(&path, None).unwrap();
        assert_eq!(back.column_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(back.row_count(), 0, "no rows expected from {}", format);
    }
}

#[test]
fn test_uppercase_extension_dispatches() {
    let dir = TempDir::new().unwrap();
    let path = path_in(&dir, "PEOPLE.XLSX");
    write_table(&people(), &path, DEFAULT_SHEET_NAME).unwrap();
    assert_eq!(read_table(&path, None).unwrap(), people());
}

#[test]
fn test_convert_between_formats() {
    let dir = TempDir::new().unwrap();
    let csv = path_in(&dir, "people.csv");
    let xls = path_in(&dir, "people.xls");
    let xlsb = path_in(&dir, "people.xlsb");

    write_table(&people(), &csv, DEFAULT_SHEET_NAME).unwrap();
    let table = read_table(&csv, None).unwrap();
    write_table(&table, &xls, "People").unwrap();
    let table = read_table(&xls, Some("People")).unwrap();
    write_table(&table, &xlsb, "People").unwrap();

    assert_eq!(read_table(&xlsb, Some("People")).unwrap(), people());
}

#[test]
fn test_overwrite_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = path_in(&dir, "out.xlsx");
    write_table(&people(), &path, DEFAULT_SHEET_NAME).unwrap();

    let mut small = Table::with_columns(["only"]);
    small.push_row(["value"]);
    write_table(&small, &path, DEFAULT_SHEET_NAME).unwrap();
    assert_eq!(read_table(&path, None).unwrap(), small);
}

// ═══════════════════════════════════════════════════════════════════════════
// DISPATCH FAILURES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_unsupported_extension_read() {
    let dir = TempDir::new().unwrap();
    let path = path_in(&dir, "data.unknown");
    fs::write(&path, "a,b\n1,2\n").unwrap();
    assert!(matches!(
        read_table(&path, None),
        Err(CodecError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_unsupported_extension_write_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let path = path_in(&dir, "foo.unknown");
    assert!(matches!(
        write_table(&people(), &path, DEFAULT_SHEET_NAME),
        Err(CodecError::UnsupportedFormat(_))
    ));
    assert!(!path.exists());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = read_table(path_in(&dir, "absent.csv"), None);
    assert!(matches!(result, Err(CodecError::Io(_))));
}

#[test]
fn test_invalid_sheet_name_on_write() {
    let dir = TempDir::new().unwrap();
    for ext in ["xlsx", "xls", "xlsb"] {
        let path = path_in(&dir, &format!("bad.{}", ext));
        let result = write_table(&people(), &path, "no:colons");
        assert!(
            matches!(result, Err(CodecError::InvalidSheetName(_))),
            "{} should reject the sheet name",
            ext
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SHEET RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_sheet_resolution() {
    let dir = TempDir::new().unwrap();
    for ext in ["xlsx", "xls", "xlsb"] {
        let path = path_in(&dir, &format!("named.{}", ext));
        write_table(&people(), &path, "Staff").unwrap();

        assert_eq!(sheet_names(&path).unwrap(), vec!["Staff".to_string()]);
        assert_eq!(read_table(&path, Some("Staff")).unwrap(), people());
        assert_eq!(read_table(&path, None).unwrap(), people());
        match read_table(&path, Some("Missing")) {
            Err(CodecError::SheetNotFound(name)) => assert_eq!(name, "Missing"),
            other => panic!("expected SheetNotFound from .{}, got {:?}", ext, other),
        }
    }
}

#[test]
fn test_csv_ignores_sheet_argument() {
    let dir = TempDir::new().unwrap();
    let path = path_in(&dir, "people.csv");
    write_table(&people(), &path, "Whatever").unwrap();
    assert!(sheet_names(&path).unwrap().is_empty());
    assert_eq!(read_table(&path, Some("Anything")).unwrap(), people());
}

// ═══════════════════════════════════════════════════════════════════════════
// DELIMITED TEXT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_csv_blank_lines_skipped() {
    let dir = TempDir::new().unwrap();
    let path = path_in(&dir, "gaps.csv");
    fs::write(&path, "a,b\n1,2\n\n3,4").unwrap();

    let table = read_table(&path, None).unwrap();
    assert_eq!(table.rows, vec![vec!["1", "2"], vec!["3", "4"]]);
}

#[test]
fn test_csv_rows_clamped_to_header() {
    let dir = TempDir::new().unwrap();
    let path = path_in(&dir, "wide.csv");
    fs::write(&path, "a,b,c\n1,2,3,4,5\nx\n").unwrap();

    let table = read_table(&path, None).unwrap();
    assert_eq!(table.column_count(), 3);
    assert_eq!(table.rows, vec![vec!["1", "2", "3"], vec!["x", "", ""]]);
}

#[test]
fn test_csv_blank_first_line_is_header() {
    let dir = TempDir::new().unwrap();
    let path = path_in(&dir, "blank_header.csv");
    fs::write(&path, "\n1,2\n3,4\n").unwrap();

    let table = read_table(&path, None).unwrap();
    assert_eq!(table.column_names().collect::<Vec<_>>(), vec![""]);
    assert_eq!(table.row_count(), 2);

    fs::write(&path, "\n").unwrap();
    let table = read_table(&path, None).unwrap();
    assert_eq!(table.column_count(), 1);
    assert_eq!(table.row_count(), 0);
}

#[test]
fn test_csv_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = path_in(&dir, "empty.csv");
    fs::write(&path, "").unwrap();
    assert!(matches!(
        read_table(&path, None),
        Err(CodecError::EmptyInput(_))
    ));
}

#[test]
fn test_csv_tab_delimiter() {
    let dir = TempDir::new().unwrap();
    let path = path_in(&dir, "people.csv");
    let options = CodecOptions {
        csv: CsvOptions { delimiter: b'\t' },
    };

    write_table_with(&people(), &path, DEFAULT_SHEET_NAME, &options).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("id\tname\tcity\n"));
    assert_eq!(
        read_table_with(&path, None, &options).unwrap(),
        people()
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// SPREADSHEET VALUES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_empty_values_inside_rows() {
    let dir = TempDir::new().unwrap();
    let mut table = Table::with_columns(["a", "b", "c"]);
    table.push_row(["", "middle", ""]);
    table.push_row(["left", "", "right"]);

    for format in Format::ALL {
        let path = path_in(&dir, &format!("sparse.{}", format.extension()));
        write_table(&table, &path, DEFAULT_SHEET_NAME).unwrap();
        assert_eq!(read_table(&path, None).unwrap(), table, "{}", format);
    }
}

#[test]
fn test_unicode_values() {
    let dir = TempDir::new().unwrap();
    let mut table = Table::with_columns(["ключ", "値"]);
    table.push_row(["α", "日本語テキスト"]);
    table.push_row(["emoji", "🙂"]);

    for format in Format::ALL {
        let path = path_in(&dir, &format!("unicode.{}", format.extension()));
        write_table(&table, &path, DEFAULT_SHEET_NAME).unwrap();
        assert_eq!(read_table(&path, None).unwrap(), table, "{}", format);
    }
}

#[test]
fn test_many_rows_xls() {
    let dir = TempDir::new().unwrap();
    let path = path_in(&dir, "many.xls");
    let mut table = Table::with_columns(["n", "label"]);
    for i in 0..2000 {
        table.push_row([i.to_string(), format!("row number {}", i)]);
    }

    write_table(&table, &path, DEFAULT_SHEET_NAME).unwrap();
    let back = read_table(&path, None).unwrap();
    assert_eq!(back.row_count(), 2000);
    assert_eq!(back.value(1999, "label"), Some("row number 1999"));
}

// ═══════════════════════════════════════════════════════════════════════════
// XLSX SHEETS FROM OTHER WRITERS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_xlsx_header_gap_keeps_columns_aligned() {
    let dir = TempDir::new().unwrap();
    let path = path_in(&dir, "gap.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "id").unwrap();
    sheet.write_string(0, 2, "name").unwrap();
    sheet.write_string(1, 0, "1").unwrap();
    sheet.write_string(1, 2, "ada").unwrap();
    workbook.save(&path).unwrap();

    let table = read_table(&path, None).unwrap();
    assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["id", "name"]);
    assert_eq!(table.rows, vec![vec!["1", "ada"]]);
}

#[test]
fn test_xlsx_sheet_starting_after_column_a() {
    let dir = TempDir::new().unwrap();
    let path = path_in(&dir, "offset.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 1, "id").unwrap();
    sheet.write_string(0, 2, "name").unwrap();
    sheet.write_string(1, 1, "1").unwrap();
    sheet.write_string(1, 2, "ada").unwrap();
    workbook.save(&path).unwrap();

    let table = read_table(&path, None).unwrap();
    assert_eq!(table.value(0, "id"), Some("1"));
    assert_eq!(table.value(0, "name"), Some("ada"));
}

#[test]
fn test_xlsx_date_cell_outside_calendar() {
    let dir = TempDir::new().unwrap();
    let path = path_in(&dir, "dates.xlsx");
    let date = CellFormat::new().set_num_format("yyyy-mm-dd");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "when").unwrap();
    sheet.write_number_with_format(1, 0, 45292.0, &date).unwrap();
    sheet.write_number_with_format(2, 0, 1.0e12, &date).unwrap();
    workbook.save(&path).unwrap();

    let table = read_table(&path, None).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.rows[0][0], "2024-01-01");
    assert!(!table.rows[1][0].is_empty());
}
