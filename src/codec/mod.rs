//! Format dispatch for table import/export
//!
//! `read_table` and `write_table` pick a strategy from the lower-cased file
//! extension:
//! - `.xlsx` → zipped spreadsheet (calamine / rust_xlsxwriter)
//! - `.xls`  → legacy binary workbook (calamine / BIFF8 writer)
//! - `.csv`  → delimited text, no quoting
//! - `.xlsb` → binary workbook (calamine / BIFF12 writer)
//!
//! Unknown extensions fail with [`CodecError::UnsupportedFormat`] before any
//! file is touched.

mod biff;
mod biff12;
mod cell;
mod compound;
mod delimited;
mod xls;
mod xlsb;
mod xlsx;

use crate::error::{CodecError, CodecResult};
use crate::types::Table;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Sheet name used by `write_table` when the caller does not pick one
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Options for the delimited text codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field separator; no quoting or escaping is applied around it
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Per-call codec configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecOptions {
    pub csv: CsvOptions,
}

/// On-disk encodings known to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Xlsx,
    Xls,
    Csv,
    Xlsb,
}

type ReadFn = fn(&Path, Option<&str>, &CodecOptions) -> CodecResult<Table>;
type WriteFn = fn(&Table, &Path, &str, &CodecOptions) -> CodecResult<()>;
type SheetsFn = fn(&Path) -> CodecResult<Vec<String>>;

/// Read/write pair selected by [`Format`]
struct Strategy {
    read: ReadFn,
    write: WriteFn,
    sheet_names: SheetsFn,
}

const XLSX: Strategy = Strategy {
    read: xlsx::read,
    write: xlsx::write,
    sheet_names: xlsx::sheet_names,
};

const XLS: Strategy = Strategy {
    read: xls::read,
    write: xls::write,
    sheet_names: xls::sheet_names,
};

const CSV: Strategy = Strategy {
    read: delimited::read,
    write: delimited::write,
    sheet_names: delimited::sheet_names,
};

const XLSB: Strategy = Strategy {
    read: xlsb::read,
    write: xlsb::write,
    sheet_names: xlsb::sheet_names,
};

impl Format {
    pub const ALL: [Format; 4] = [Format::Xlsx, Format::Xls, Format::Csv, Format::Xlsb];

    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path<P: AsRef<Path>>(path: P) -> CodecResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        Self::ALL
            .into_iter()
            .find(|format| format.extension() == extension)
            .ok_or_else(|| CodecError::UnsupportedFormat(path.display().to_string()))
    }

    /// File extension without the leading dot
    pub fn extension(self) -> &'static str {
        match self {
            Format::Xlsx => "xlsx",
            Format::Xls => "xls",
            Format::Csv => "csv",
            Format::Xlsb => "xlsb",
        }
    }

    fn strategy(self) -> &'static Strategy {
        match self {
            Format::Xlsx => &XLSX,
            Format::Xls => &XLS,
            Format::Csv => &CSV,
            Format::Xlsb => &XLSB,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.extension())
    }
}

/// Read a table from `path`, from `sheet` or the first sheet
pub fn read_table<P: AsRef<Path>>(path: P, sheet: Option<&str>) -> CodecResult<Table> {
    read_table_with(path, sheet, &CodecOptions::default())
}

/// Write `table` to a brand-new file at `path`
pub fn write_table<P: AsRef<Path>>(table: &Table, path: P, sheet: &str) -> CodecResult<()> {
    write_table_with(table, path, sheet, &CodecOptions::default())
}

pub fn read_table_with<P: AsRef<Path>>(
    path: P,
    sheet: Option<&str>,
    options: &CodecOptions,
) -> CodecResult<Table> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    debug!(path = %path.display(), %format, sheet, "reading table");
    (format.strategy().read)(path, sheet, options)
}

pub fn write_table_with<P: AsRef<Path>>(
    table: &Table,
    path: P,
    sheet: &str,
    options: &CodecOptions,
) -> CodecResult<()> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    debug!(path = %path.display(), %format, sheet, "writing table");
    (format.strategy().write)(table, path, sheet, options)
}

/// Sheet names in workbook order; delimited text has no sheets
pub fn sheet_names<P: AsRef<Path>>(path: P) -> CodecResult<Vec<String>> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    (format.strategy().sheet_names)(path)
}

/// Pick `requested` if present, otherwise the first sheet
fn resolve_sheet(names: &[String], requested: Option<&str>) -> CodecResult<String> {
    match requested {
        Some(name) => names
            .iter()
            .find(|n| n.as_str() == name)
            .cloned()
            .ok_or_else(|| CodecError::SheetNotFound(name.to_string())),
        None => names
            .first()
            .cloned()
            .ok_or_else(|| CodecError::SheetNotFound("<first sheet>".to_string())),
    }
}

/// Sheet names accepted by the spreadsheet writers: 1-31 characters, none of
/// `[ ] : * ? / \`, and no leading or trailing apostrophe.
fn validate_sheet_name(name: &str) -> CodecResult<()> {
    let length = name.chars().count();
    let invalid = length == 0
        || length > 31
        || name.starts_with('\'')
        || name.ends_with('\'')
        || name.contains(['[', ']', ':', '*', '?', '/', '\\']);
    if invalid {
        return Err(CodecError::InvalidSheetName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sheet_name() {
        assert!(validate_sheet_name("Sheet1").is_ok());
        assert!(validate_sheet_name("Q1 Sales (EU)").is_ok());
        assert!(validate_sheet_name(&"x".repeat(31)).is_ok());
        let too_long = "x".repeat(32);
        for bad in ["", "a/b", "a[1]", "what?", "'quoted'", too_long.as_str()] {
            assert!(
                matches!(validate_sheet_name(bad), Err(CodecError::InvalidSheetName(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path("a.xlsx").unwrap(), Format::Xlsx);
        assert_eq!(Format::from_path("a.XLS").unwrap(), Format::Xls);
        assert_eq!(Format::from_path("dir/a.Csv").unwrap(), Format::Csv);
        assert_eq!(Format::from_path("a.b.xlsb").unwrap(), Format::Xlsb);
    }

    #[test]
    fn test_format_rejects_unknown_extension() {
        for path in ["foo.unknown", "foo", "foo.xlsm", "foo.xlsx.bak"] {
            assert!(
                matches!(Format::from_path(path), Err(CodecError::UnsupportedFormat(_))),
                "{} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_format_display() {
        assert_eq!(Format::Xlsb.to_string(), ".xlsb");
    }

    #[test]
    fn test_resolve_sheet() {
        let names = vec!["Data".to_string(), "Other".to_string()];
        assert_eq!(resolve_sheet(&names, None).unwrap(), "Data");
        assert_eq!(resolve_sheet(&names, Some("Other")).unwrap(), "Other");
        assert!(matches!(
            resolve_sheet(&names, Some("data")),
            Err(CodecError::SheetNotFound(_))
        ));
        assert!(matches!(
            resolve_sheet(&[], None),
            Err(CodecError::SheetNotFound(_))
        ));
    }

    #[test]
    fn test_default_csv_options() {
        assert_eq!(CodecOptions::default().csv.delimiter, b',');
    }
}
