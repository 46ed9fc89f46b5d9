//! Cell-to-text conversion shared by the calamine-backed readers

use calamine::{Data, Range};
use chrono::{NaiveDate, TimeDelta};

/// Render a cell as the text a spreadsheet would display in a "General" cell
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(dt) => serial_to_text(dt.as_f64()).unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

/// Text at an absolute (row, col) position; outside the used range is empty
pub fn text_at(range: &Range<Data>, row: u32, col: u32) -> String {
    range.get_value((row, col)).map(cell_text).unwrap_or_default()
}

/// True when the cell at (row, col) holds a value
pub fn is_populated(range: &Range<Data>, row: u32, col: u32) -> bool {
    range
        .get_value((row, col))
        .is_some_and(|c| !matches!(c, Data::Empty))
}

/// Number of populated cells in `row` at or beyond column `from`
pub fn populated_from(range: &Range<Data>, row: u32, from: u32) -> usize {
    match range.end() {
        Some((_, last_col)) if from <= last_col => (from..=last_col)
            .filter(|&col| is_populated(range, row, col))
            .count(),
        _ => 0,
    }
}

/// Excel 1900-system serial number as `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`,
/// or `HH:MM:SS` for a time of day without a date part.
///
/// `None` when the serial falls outside the representable calendar.
fn serial_to_text(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    // Serials below 60 predate the phantom 1900-02-29
    let epoch = if serial < 60.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let millis = (serial * 86_400_000.0).round() as i64;
    let datetime = epoch
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::try_milliseconds(millis)?)?;
    if serial < 1.0 {
        Some(datetime.format("%H:%M:%S").to_string())
    } else if serial.fract() == 0.0 {
        Some(datetime.format("%Y-%m-%d").to_string())
    } else {
        Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}
