use std::path::PathBuf;
use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;

/// Failures surfaced by `read_table` / `write_table`.
///
/// Collaborator errors (I/O, spreadsheet engines, zip container) pass through
/// untranslated so callers keep the native error information.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("CSV file is empty: {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Xlsx(#[from] calamine::XlsxError),

    #[error(transparent)]
    Xls(#[from] calamine::XlsError),

    #[error(transparent)]
    Xlsb(#[from] calamine::XlsbError),

    #[error(transparent)]
    XlsxWriter(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}
