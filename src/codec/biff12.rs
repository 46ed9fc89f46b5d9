//! BIFF12 record writer for the binary workbook (.xlsb)
//!
//! A record is `type | size | data`. The type is 1-2 bytes and the size
//! 1-4 bytes, both little-endian base-128 with a continuation bit.

use crate::error::{CodecError, CodecResult};
use std::io::Write;

pub mod record_types {
    pub const ROW_HDR: u16 = 0x0000;
    pub const CELL_ST: u16 = 0x0006;
    pub const BEGIN_SHEET: u16 = 0x0081;
    pub const END_SHEET: u16 = 0x0082;
    pub const BEGIN_BOOK: u16 = 0x0083;
    pub const END_BOOK: u16 = 0x0084;
    pub const BEGIN_BUNDLE_SHS: u16 = 0x008F;
    pub const END_BUNDLE_SHS: u16 = 0x0090;
    pub const BEGIN_SHEET_DATA: u16 = 0x0091;
    pub const END_SHEET_DATA: u16 = 0x0092;
    pub const WS_DIM: u16 = 0x0094;
    pub const WB_PROP: u16 = 0x0099;
    pub const BUNDLE_SH: u16 = 0x009C;
}

/// Largest record size expressible in four size bytes
const MAX_RECORD_SIZE: usize = (1 << 28) - 1;

/// Default row height, 15pt in twips
const DEFAULT_ROW_HEIGHT: u16 = 0x012C;

/// Record writer over any byte sink
pub struct RecordWriter<W: Write> {
    writer: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(writer: W) -> Self {
        RecordWriter { writer }
    }

    /// Write a complete record with header and data
    pub fn write_record(&mut self, record_type: u16, data: &[u8]) -> CodecResult<()> {
        if data.len() > MAX_RECORD_SIZE {
            return Err(CodecError::LimitExceeded(format!(
                "BIFF12 record 0x{:04X} needs {} bytes",
                record_type,
                data.len()
            )));
        }
        self.write_type(record_type)?;
        self.write_size(data.len())?;
        self.writer.write_all(data)?;
        Ok(())
    }

    fn write_type(&mut self, record_type: u16) -> CodecResult<()> {
        let low = (record_type & 0x7F) as u8;
        let high = (record_type >> 7) as u8;
        if high == 0 {
            self.writer.write_all(&[low])?;
        } else {
            self.writer.write_all(&[low | 0x80, high])?;
        }
        Ok(())
    }

    fn write_size(&mut self, mut size: usize) -> CodecResult<()> {
        loop {
            let mut byte = (size & 0x7F) as u8;
            size >>= 7;
            if size > 0 {
                byte |= 0x80;
            }
            self.writer.write_all(&[byte])?;
            if size == 0 {
                return Ok(());
            }
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn push_u32(data: &mut Vec<u8>, value: u32) {
    data.extend_from_slice(&value.to_le_bytes());
}

/// XLWideString: character count (u32) then UTF-16LE
fn push_wide_string(data: &mut Vec<u8>, value: &str) {
    let units: Vec<u16> = value.encode_utf16().collect();
    push_u32(data, units.len() as u32);
    for unit in units {
        data.extend_from_slice(&unit.to_le_bytes());
    }
}

/// Workbook properties: 1900 date system, no theme, no code name
pub fn write_workbook_properties<W: Write>(writer: &mut RecordWriter<W>) -> CodecResult<()> {
    let mut data = Vec::with_capacity(12);
    push_u32(&mut data, 0);
    push_u32(&mut data, 0);
    push_wide_string(&mut data, "");
    writer.write_record(record_types::WB_PROP, &data)
}

/// One visible sheet entry pointing at relationship `rel_id`
pub fn write_bundle_sheet<W: Write>(
    writer: &mut RecordWriter<W>,
    tab_id: u32,
    rel_id: &str,
    name: &str,
) -> CodecResult<()> {
    let mut data = Vec::new();
    push_u32(&mut data, 0); // visible
    push_u32(&mut data, tab_id);
    push_wide_string(&mut data, rel_id);
    push_wide_string(&mut data, name);
    writer.write_record(record_types::BUNDLE_SH, &data)
}

/// Used range; an empty sheet reports A1:A1
pub fn write_dimensions<W: Write>(
    writer: &mut RecordWriter<W>,
    last_row: u32,
    last_col: u32,
) -> CodecResult<()> {
    let mut data = Vec::with_capacity(16);
    push_u32(&mut data, 0);
    push_u32(&mut data, last_row);
    push_u32(&mut data, 0);
    push_u32(&mut data, last_col);
    writer.write_record(record_types::WS_DIM, &data)
}

/// Row header with a single column span `first_col..=last_col`
pub fn write_row_header<W: Write>(
    writer: &mut RecordWriter<W>,
    row: u32,
    span: Option<(u32, u32)>,
) -> CodecResult<()> {
    let mut data = Vec::with_capacity(25);
    push_u32(&mut data, row);
    push_u32(&mut data, 0); // style
    data.extend_from_slice(&DEFAULT_ROW_HEIGHT.to_le_bytes());
    data.extend_from_slice(&[0, 0, 0]); // padding, outline/visibility, phonetic flags
    match span {
        Some((first, last)) => {
            push_u32(&mut data, 1);
            push_u32(&mut data, first);
            push_u32(&mut data, last);
        }
        None => push_u32(&mut data, 0),
    }
    writer.write_record(record_types::ROW_HDR, &data)
}

/// Inline string cell: column, style, then the string
pub fn write_string_cell<W: Write>(
    writer: &mut RecordWriter<W>,
    col: u32,
    value: &str,
) -> CodecResult<()> {
    let mut data = Vec::with_capacity(12 + value.len() * 2);
    push_u32(&mut data, col);
    push_u32(&mut data, 0); // style 0, no phonetic guide
    push_wide_string(&mut data, value);
    writer.write_record(record_types::CELL_ST, &data)
}
