//! BIFF8 record writer for the legacy binary workbook (.xls)
//!
//! Each record is `type (u16) | length (u16) | data`, little-endian, with at
//! most [`MAX_RECORD_DATA`] bytes of data. Longer shared string tables spill
//! into CONTINUE records.
//!
//! Only the records needed for a single text-only worksheet are emitted:
//! workbook globals (BOF, CODEPAGE, WINDOW1, FONT, XF, STYLE, BOUNDSHEET, SST,
//! EOF) and the sheet substream (BOF, DIMENSIONS, WINDOW2, LABELSST, EOF).

use crate::error::{CodecError, CodecResult};
use std::io::Write;

pub const MAX_RECORD_DATA: usize = 8224;

/// Rows addressable by a BIFF8 sheet
pub const MAX_ROWS: usize = 65_536;
/// Columns addressable by a BIFF8 sheet
pub const MAX_COLUMNS: usize = 256;

/// XF index of the default cell format (after the 15 style XFs)
pub const DEFAULT_CELL_XF: u16 = 15;

pub mod record_types {
    pub const BOF: u16 = 0x0809;
    pub const EOF: u16 = 0x000A;
    pub const CODEPAGE: u16 = 0x0042;
    pub const WINDOW1: u16 = 0x003D;
    pub const FONT: u16 = 0x0031;
    pub const XF: u16 = 0x00E0;
    pub const STYLE: u16 = 0x0293;
    pub const BOUNDSHEET: u16 = 0x0085;
    pub const SST: u16 = 0x00FC;
    pub const CONTINUE: u16 = 0x003C;
    pub const DIMENSIONS: u16 = 0x0200;
    pub const WINDOW2: u16 = 0x023E;
    pub const LABELSST: u16 = 0x00FD;
}

/// BOF substream kinds
pub const BOF_WORKBOOK_GLOBALS: u16 = 0x0005;
pub const BOF_WORKSHEET: u16 = 0x0010;

/// Write one record; `data` must fit in a single record
pub fn write_record<W: Write>(writer: &mut W, record_type: u16, data: &[u8]) -> CodecResult<()> {
    if data.len() > MAX_RECORD_DATA {
        return Err(CodecError::LimitExceeded(format!(
            "BIFF record 0x{:04X} needs {} bytes (max {})",
            record_type,
            data.len(),
            MAX_RECORD_DATA
        )));
    }
    writer.write_all(&record_type.to_le_bytes())?;
    writer.write_all(&(data.len() as u16).to_le_bytes())?;
    writer.write_all(data)?;
    Ok(())
}

/// BOF record (BIFF8, 16 bytes)
pub fn write_bof<W: Write>(writer: &mut W, substream: u16) -> CodecResult<()> {
    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&0x0600u16.to_le_bytes()); // BIFF8
    data.extend_from_slice(&substream.to_le_bytes());
    data.extend_from_slice(&0x0DBBu16.to_le_bytes()); // rupBuild
    data.extend_from_slice(&0x07CCu16.to_le_bytes()); // rupYear
    data.extend_from_slice(&0x0000_0041u32.to_le_bytes()); // file history flags
    data.extend_from_slice(&0x0000_0006u32.to_le_bytes()); // lowest BIFF version
    write_record(writer, record_types::BOF, &data)
}

pub fn write_eof<W: Write>(writer: &mut W) -> CodecResult<()> {
    write_record(writer, record_types::EOF, &[])
}

/// CODEPAGE record; BIFF8 strings are UTF-16 (1200)
pub fn write_codepage<W: Write>(writer: &mut W) -> CodecResult<()> {
    write_record(writer, record_types::CODEPAGE, &0x04B0u16.to_le_bytes())
}

/// WINDOW1 record with a single visible, selected tab
pub fn write_window1<W: Write>(writer: &mut W) -> CodecResult<()> {
    let mut data = Vec::with_capacity(18);
    for v in [0x0000u16, 0x0000, 0x4000, 0x2000, 0x0038, 0x0000, 0x0000, 0x0001, 0x0258] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    write_record(writer, record_types::WINDOW1, &data)
}

/// FONT record for the default 10pt Arial
pub fn write_default_font<W: Write>(writer: &mut W) -> CodecResult<()> {
    let mut data = Vec::with_capacity(21);
    data.extend_from_slice(&200u16.to_le_bytes()); // height in twips
    data.extend_from_slice(&0u16.to_le_bytes()); // attributes
    data.extend_from_slice(&0x7FFFu16.to_le_bytes()); // automatic colour
    data.extend_from_slice(&400u16.to_le_bytes()); // normal weight
    data.extend_from_slice(&0u16.to_le_bytes()); // no super/subscript
    data.extend_from_slice(&[0, 0, 0, 0]); // underline, family, charset, reserved
    write_short_string(&mut data, "Arial");
    write_record(writer, record_types::FONT, &data)
}

/// The 15 style XFs Excel expects, followed by the default cell XF
pub fn write_default_xfs<W: Write>(writer: &mut W) -> CodecResult<()> {
    for _ in 0..DEFAULT_CELL_XF {
        write_xf(writer, true)?;
    }
    write_xf(writer, false)
}

fn write_xf<W: Write>(writer: &mut W, style: bool) -> CodecResult<()> {
    // locked; style XFs have no parent (0xFFF), cell XFs inherit style XF 0
    let flags: u16 = if style { 0xFFF5 } else { 0x0001 };
    let mut data = Vec::with_capacity(20);
    data.extend_from_slice(&0u16.to_le_bytes()); // font
    data.extend_from_slice(&0u16.to_le_bytes()); // number format "General"
    data.extend_from_slice(&flags.to_le_bytes());
    data.push(0x20); // bottom aligned
    data.push(0x00); // rotation
    data.push(0x00); // indent
    data.push(if style { 0xF4 } else { 0x00 }); // attribute groups used
    data.extend_from_slice(&0u32.to_le_bytes()); // borders
    data.extend_from_slice(&0u32.to_le_bytes()); // border colours, fill pattern
    data.extend_from_slice(&0x20C0u16.to_le_bytes()); // fill colours
    write_record(writer, record_types::XF, &data)
}

/// Built-in "Normal" STYLE record
pub fn write_normal_style<W: Write>(writer: &mut W) -> CodecResult<()> {
    let mut data = Vec::with_capacity(4);
    data.extend_from_slice(&0x8000u16.to_le_bytes()); // built-in, XF 0
    data.push(0x00); // Normal
    data.push(0xFF); // outline level
    write_record(writer, record_types::STYLE, &data)
}

/// BOUNDSHEET record; returns the offset of its stream position field within
/// `stream` so it can be patched once the sheet BOF offset is known.
pub fn write_boundsheet(stream: &mut Vec<u8>, name: &str) -> CodecResult<usize> {
    let position_offset = stream.len() + 4;
    let mut data = Vec::with_capacity(8 + name.len() * 2);
    data.extend_from_slice(&0u32.to_le_bytes()); // patched later
    data.push(0x00); // visible
    data.push(0x00); // worksheet
    write_short_string(&mut data, name);
    write_record(stream, record_types::BOUNDSHEET, &data)?;
    Ok(position_offset)
}

/// DIMENSIONS record; `rows`/`cols` are counts (last index + 1)
pub fn write_dimensions<W: Write>(writer: &mut W, rows: u32, cols: u16) -> CodecResult<()> {
    let mut data = Vec::with_capacity(14);
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&rows.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&cols.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    write_record(writer, record_types::DIMENSIONS, &data)
}

/// WINDOW2 record for a selected sheet with gridlines and headers
pub fn write_window2<W: Write>(writer: &mut W) -> CodecResult<()> {
    let mut data = Vec::with_capacity(18);
    data.extend_from_slice(&0x06B6u16.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes()); // top row
    data.extend_from_slice(&0u16.to_le_bytes()); // left column
    data.extend_from_slice(&0x40u32.to_le_bytes()); // gridline colour
    data.extend_from_slice(&0u16.to_le_bytes()); // page break preview zoom
    data.extend_from_slice(&0u16.to_le_bytes()); // normal zoom
    data.extend_from_slice(&0u32.to_le_bytes());
    write_record(writer, record_types::WINDOW2, &data)
}

/// LABELSST cell referencing entry `sst_index` of the shared string table
pub fn write_labelsst<W: Write>(
    writer: &mut W,
    row: u16,
    col: u16,
    xf_index: u16,
    sst_index: u32,
) -> CodecResult<()> {
    let mut data = Vec::with_capacity(10);
    data.extend_from_slice(&row.to_le_bytes());
    data.extend_from_slice(&col.to_le_bytes());
    data.extend_from_slice(&xf_index.to_le_bytes());
    data.extend_from_slice(&sst_index.to_le_bytes());
    write_record(writer, record_types::LABELSST, &data)
}

/// SST record followed by as many CONTINUE records as needed.
///
/// A string header (cch + flags) never straddles a record boundary; string
/// bodies that do are resumed in the next CONTINUE with a fresh flags byte.
pub fn write_sst<W: Write>(writer: &mut W, strings: &[String], total: u32) -> CodecResult<()> {
    let mut records: Vec<Vec<u8>> = Vec::new();
    let mut buffer: Vec<u8> = Vec::with_capacity(MAX_RECORD_DATA);
    buffer.extend_from_slice(&total.to_le_bytes());
    buffer.extend_from_slice(&(strings.len() as u32).to_le_bytes());

    for s in strings {
        let (high_byte, body, char_width) = encode_biff8(s);
        let cch = body.len() / char_width;
        if cch > u16::MAX as usize {
            return Err(CodecError::LimitExceeded(format!(
                "cell text of {} characters exceeds the BIFF8 limit",
                cch
            )));
        }

        if MAX_RECORD_DATA - buffer.len() < 3 {
            records.push(std::mem::take(&mut buffer));
        }
        buffer.extend_from_slice(&(cch as u16).to_le_bytes());
        buffer.push(high_byte);

        let mut written = 0;
        while written < body.len() {
            let mut room = (MAX_RECORD_DATA - buffer.len()).min(body.len() - written);
            room -= room % char_width;
            if room == 0 {
                records.push(std::mem::take(&mut buffer));
                buffer.push(high_byte);
                continue;
            }
            buffer.extend_from_slice(&body[written..written + room]);
            written += room;
        }
    }
    records.push(buffer);

    for (i, data) in records.iter().enumerate() {
        let record_type = if i == 0 {
            record_types::SST
        } else {
            record_types::CONTINUE
        };
        write_record(writer, record_type, data)?;
    }
    Ok(())
}

/// ShortXLUnicodeString: cch (u8), flags, characters
fn write_short_string(data: &mut Vec<u8>, value: &str) {
    let (high_byte, body, char_width) = encode_biff8(value);
    data.push((body.len() / char_width) as u8);
    data.push(high_byte);
    data.extend_from_slice(&body);
}

/// Compressed single bytes for ASCII, UTF-16LE otherwise
fn encode_biff8(value: &str) -> (u8, Vec<u8>, usize) {
    if value.is_ascii() {
        (0x00, value.as_bytes().to_vec(), 1)
    } else {
        let body = value.encode_utf16().flat_map(u16::to_le_bytes).collect();
        (0x01, body, 2)
    }
}
