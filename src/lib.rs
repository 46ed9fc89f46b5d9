//! sheetcodec - tabular data in and out of spreadsheet and text files
//!
//! A [`Table`] is a list of named columns plus rows of text values. The codec
//! layer converts it to and from four encodings, chosen by file extension:
//!
//! - `.xlsx` zipped spreadsheet
//! - `.xls` legacy binary workbook
//! - `.csv` delimited text (no quoting)
//! - `.xlsb` binary workbook
//!
//! Every cell is carried as text. The first row of a sheet is the header, and
//! every row is sized to the header: extra values are dropped, missing ones
//! become empty strings.
//!
//! # Example
//!
//! ```no_run
//! use sheetcodec::{read_table, write_table, DEFAULT_SHEET_NAME};
//!
//! let table = read_table("report.xlsx", None)?;
//! println!("{} columns, {} rows", table.column_count(), table.row_count());
//!
//! write_table(&table, "report.csv", DEFAULT_SHEET_NAME)?;
//! # Ok::<(), sheetcodec::CodecError>(())
//! ```

pub mod cli;
pub mod codec;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use codec::{
    read_table, read_table_with, sheet_names, write_table, write_table_with, CodecOptions,
    CsvOptions, Format, DEFAULT_SHEET_NAME,
};
pub use error::{CodecError, CodecResult};
pub use types::{Column, Row, Table};
