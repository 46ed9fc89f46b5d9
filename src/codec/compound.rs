//! Compound file (OLE2) container holding a single stream
//!
//! Version 3 layout with 512-byte sectors:
//!
//! ```text
//! header | stream sectors | FAT sectors | DIFAT sectors | directory sector
//! ```
//!
//! Streams below the mini-stream cutoff are zero-padded up to it so that no
//! MiniFAT is needed.

use crate::error::{CodecError, CodecResult};
use std::io::Write;

const MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

const SECTOR_SIZE: usize = 512;
const MINI_STREAM_CUTOFF: usize = 4096;
const DIR_ENTRY_SIZE: usize = 128;

const ENTRIES_PER_FAT_SECTOR: usize = SECTOR_SIZE / 4;
/// FAT sector ids stored in the header itself
const HEADER_DIFAT_ENTRIES: usize = 109;
/// Last slot of a DIFAT sector links to the next one
const ENTRIES_PER_DIFAT_SECTOR: usize = ENTRIES_PER_FAT_SECTOR - 1;

const DIFSECT: u32 = 0xFFFF_FFFC;
const FATSECT: u32 = 0xFFFF_FFFD;
const ENDOFCHAIN: u32 = 0xFFFF_FFFE;
const FREESECT: u32 = 0xFFFF_FFFF;
const NOSTREAM: u32 = 0xFFFF_FFFF;

const STGTY_STREAM: u8 = 2;
const STGTY_ROOT: u8 = 5;
const COLOR_BLACK: u8 = 1;

/// Sector counts for each region, in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    data: usize,
    fat: usize,
    difat: usize,
}

impl Layout {
    fn for_stream(size: usize) -> Self {
        let data = size.div_ceil(SECTOR_SIZE);
        let mut layout = Layout {
            data,
            fat: 1,
            difat: 0,
        };
        // FAT sectors must cover themselves; grow until stable
        loop {
            let fat = layout.total().div_ceil(ENTRIES_PER_FAT_SECTOR);
            let difat = fat
                .saturating_sub(HEADER_DIFAT_ENTRIES)
                .div_ceil(ENTRIES_PER_DIFAT_SECTOR);
            if fat == layout.fat && difat == layout.difat {
                return layout;
            }
            layout.fat = fat;
            layout.difat = difat;
        }
    }

    fn fat_start(&self) -> usize {
        self.data
    }

    fn difat_start(&self) -> usize {
        self.data + self.fat
    }

    fn directory(&self) -> usize {
        self.data + self.fat + self.difat
    }

    fn total(&self) -> usize {
        self.directory() + 1
    }
}

/// Write a compound file whose only stream is `name`
pub fn write_single_stream<W: Write>(out: &mut W, name: &str, data: &[u8]) -> CodecResult<()> {
    let size = data.len().max(MINI_STREAM_CUTOFF);
    let Ok(stream_size) = u32::try_from(size) else {
        return Err(CodecError::LimitExceeded(format!(
            "{} byte stream exceeds the compound file limit",
            size
        )));
    };
    let layout = Layout::for_stream(size);

    out.write_all(&header(&layout))?;

    out.write_all(data)?;
    out.write_all(&vec![0u8; layout.data * SECTOR_SIZE - data.len()])?;

    let mut fat: Vec<u32> = (1..layout.data as u32).collect();
    fat.push(ENDOFCHAIN);
    fat.resize(fat.len() + layout.fat, FATSECT);
    fat.resize(fat.len() + layout.difat, DIFSECT);
    fat.push(ENDOFCHAIN);
    fat.resize(layout.fat * ENTRIES_PER_FAT_SECTOR, FREESECT);
    write_u32s(out, &fat)?;

    let fat_ids = fat_sector_ids(&layout);
    if fat_ids.len() > HEADER_DIFAT_ENTRIES {
        let overflow = &fat_ids[HEADER_DIFAT_ENTRIES..];
        for (i, chunk) in overflow.chunks(ENTRIES_PER_DIFAT_SECTOR).enumerate() {
            let mut entries = chunk.to_vec();
            entries.resize(ENTRIES_PER_DIFAT_SECTOR, FREESECT);
            entries.push(if i + 1 < layout.difat {
                (layout.difat_start() + i + 1) as u32
            } else {
                ENDOFCHAIN
            });
            write_u32s(out, &entries)?;
        }
    }

    out.write_all(&directory_sector(name, stream_size))?;
    Ok(())
}

fn fat_sector_ids(layout: &Layout) -> Vec<u32> {
    (layout.fat_start()..layout.fat_start() + layout.fat)
        .map(|id| id as u32)
        .collect()
}

fn write_u32s<W: Write>(out: &mut W, values: &[u32]) -> CodecResult<()> {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    out.write_all(&bytes)?;
    Ok(())
}

fn header(layout: &Layout) -> Vec<u8> {
    let mut header = Vec::with_capacity(SECTOR_SIZE);
    header.extend_from_slice(&MAGIC);
    header.extend_from_slice(&[0u8; 16]); // CLSID
    header.extend_from_slice(&0x003Eu16.to_le_bytes()); // minor version
    header.extend_from_slice(&0x0003u16.to_le_bytes()); // major version
    header.extend_from_slice(&0xFFFEu16.to_le_bytes()); // little-endian
    header.extend_from_slice(&9u16.to_le_bytes()); // 512-byte sectors
    header.extend_from_slice(&6u16.to_le_bytes()); // 64-byte mini sectors
    header.extend_from_slice(&[0u8; 6]);

    let difat_start = if layout.difat == 0 {
        ENDOFCHAIN
    } else {
        layout.difat_start() as u32
    };
    for value in [
        0, // directory sector count, zero for version 3
        layout.fat as u32,
        layout.directory() as u32,
        0, // transaction signature
        MINI_STREAM_CUTOFF as u32,
        ENDOFCHAIN, // no MiniFAT
        0,
        difat_start,
        layout.difat as u32,
    ] {
        header.extend_from_slice(&value.to_le_bytes());
    }

    let fat_ids = fat_sector_ids(layout);
    for i in 0..HEADER_DIFAT_ENTRIES {
        let id = fat_ids.get(i).copied().unwrap_or(FREESECT);
        header.extend_from_slice(&id.to_le_bytes());
    }
    header
}

/// Root entry, the stream, and two unused slots
fn directory_sector(name: &str, size: u32) -> Vec<u8> {
    let mut sector = Vec::with_capacity(SECTOR_SIZE);
    sector.extend_from_slice(&directory_entry(
        "Root Entry",
        STGTY_ROOT,
        1,
        ENDOFCHAIN,
        0,
    ));
    sector.extend_from_slice(&directory_entry(name, STGTY_STREAM, NOSTREAM, 0, size));
    for _ in 0..2 {
        let mut unused = [0u8; DIR_ENTRY_SIZE];
        unused[68..80].fill(0xFF); // left, right, child = NOSTREAM
        sector.extend_from_slice(&unused);
    }
    sector
}

fn directory_entry(
    name: &str,
    entry_type: u8,
    child: u32,
    start: u32,
    size: u32,
) -> [u8; DIR_ENTRY_SIZE] {
    let mut entry = [0u8; DIR_ENTRY_SIZE];
    let units: Vec<u16> = name.encode_utf16().take(31).collect();
    for (i, unit) in units.iter().enumerate() {
        entry[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
    }
    let name_len = ((units.len() + 1) * 2) as u16;
    entry[64..66].copy_from_slice(&name_len.to_le_bytes());
    entry[66] = entry_type;
    entry[67] = COLOR_BLACK;
    entry[68..72].copy_from_slice(&NOSTREAM.to_le_bytes());
    entry[72..76].copy_from_slice(&NOSTREAM.to_le_bytes());
    entry[76..80].copy_from_slice(&child.to_le_bytes());
    entry[116..120].copy_from_slice(&start.to_le_bytes());
    entry[120..124].copy_from_slice(&size.to_le_bytes());
    entry
}
