//! Assembling tables into a complete font file

use crate::{be_buffer, bebuffer::BeBuffer};
use std::collections::BTreeMap;

pub const TRUETYPE_SIGNATURE: [u8; 4] = [0x00, 0x01, 0x00, 0x00];

/// Collects tables and writes them out behind a table directory
#[derive(Clone, Debug)]
pub struct FontBuilder {
    signature: [u8; 4],
    tables: BTreeMap<[u8; 4], Vec<u8>>,
}

impl Default for FontBuilder {
    fn default() -> Self {
        Self {
            signature: TRUETYPE_SIGNATURE,
            tables: BTreeMap::new(),
        }
    }
}

impl FontBuilder {
    pub fn signature(mut self, signature: [u8; 4]) -> Self {
        self.signature = signature;
        self
    }

    pub fn table(mut self, tag: &[u8; 4], data: Vec<u8>) -> Self {
        self.tables.insert(*tag, data);
        self
    }

    pub fn without_table(mut self, tag: &[u8; 4]) -> Self {
        self.tables.remove(tag);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let num_tables = self.tables.len() as u16;
        let mut entry_selector = 0_u16;
        while (1 << (entry_selector + 1)) <= num_tables {
            entry_selector += 1;
        }
        let search_range = (1 << entry_selector) * 16;
        let range_shift = num_tables * 16 - search_range.min(num_tables * 16);

        let mut directory = be_buffer! {
            self.signature,
            num_tables,
            search_range,
            entry_selector,
            range_shift,
        };

        // Table data starts after the directory and is aligned to four bytes
        let mut offset = 12 + 16 * self.tables.len();
        let mut table_data = BeBuffer::new();
        for (tag, data) in &self.tables {
            directory = directory
                .push(*tag)
                .push(checksum(data))
                .push(offset as u32)
                .push(data.len() as u32);

            table_data = table_data.extend_from_slice(data).align_to(4);
            offset = 12 + 16 * self.tables.len() + table_data.len();
        }

        directory
            .extend_from_slice(table_data.as_slice())
            .into_inner()
    }
}

fn checksum(data: &[u8]) -> u32 {
    data.chunks(4)
        .map(|chunk| {
            let mut word = [0; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_be_bytes(word)
        })
        .fold(0, u32::wrapping_add)
}

/// Values for the `head` table that matter to the parser
#[derive(Clone, Copy, Debug)]
pub struct Head {
    pub units_per_em: u16,
    pub bbox: (i16, i16, i16, i16),
    pub long_loca: bool,
}

impl Head {
    pub fn build(&self) -> Vec<u8> {
        let (min_x, min_y, max_x, max_y) = self.bbox;
        be_buffer! {
            0x0001_0000_u32,          // version
            0x0001_0000_u32,          // fontRevision
            0_u32,                    // checkSumAdjustment
            0x5F0F_3CF5_u32,          // magicNumber
            0_u16,                    // flags
            self.units_per_em,
            0_u32, 0_u32,             // created
            0_u32, 0_u32,             // modified
            min_x,
            min_y,
            max_x,
            max_y,
            0_u16,                    // macStyle
            8_u16,                    // lowestRecPPEM
            2_i16,                    // fontDirectionHint
            i16::from(self.long_loca), // indexToLocFormat
            0_i16,                    // glyphDataFormat
        }
        .into_inner()
    }
}

/// Values for the `hhea` table that matter to the parser
#[derive(Clone, Copy, Debug)]
pub struct Hhea {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub num_long_metrics: u16,
}

impl Hhea {
    pub fn build(&self) -> Vec<u8> {
        be_buffer! {
            0x0001_0000_u32,          // version
            self.ascender,
            self.descender,
            self.line_gap,
            0_u16,                    // advanceWidthMax
            0_i16,                    // minLeftSideBearing
            0_i16,                    // minRightSideBearing
            0_i16,                    // xMaxExtent
            1_i16,                    // caretSlopeRise
            0_i16,                    // caretSlopeRun
            0_i16,                    // caretOffset
            0_i16, 0_i16, 0_i16, 0_i16, // reserved
            0_i16,                    // metricDataFormat
            self.num_long_metrics,
        }
        .into_inner()
    }
}

/// A version 1.0 `maxp` table
pub fn maxp(num_glyphs: u16, max_component_depth: u16) -> Vec<u8> {
    be_buffer! {
        0x0001_0000_u32,              // version
        num_glyphs,
        0_u16,                        // maxPoints
        0_u16,                        // maxContours
        0_u16,                        // maxCompositePoints
        0_u16,                        // maxCompositeContours
        2_u16,                        // maxZones
        0_u16,                        // maxTwilightPoints
        0_u16,                        // maxStorage
        0_u16,                        // maxFunctionDefs
        0_u16,                        // maxInstructionDefs
        0_u16,                        // maxStackElements
        0_u16,                        // maxSizeOfInstructions
        0_u16,                        // maxComponentElements
        max_component_depth,
    }
    .into_inner()
}

/// Lay out glyph descriptions, returning the `glyf` and `loca` tables
pub fn glyf_and_loca(glyphs: &[Vec<u8>], long_loca: bool) -> (Vec<u8>, Vec<u8>) {
    let mut glyf = BeBuffer::new();
    let mut offsets = vec![0];
    for glyph in glyphs {
        // Short offsets can only address even positions
        glyf = glyf.extend_from_slice(glyph).align_to(2);
        offsets.push(glyf.len());
    }

    let loca = if long_loca {
        BeBuffer::new().extend(offsets.iter().map(|&offset| offset as u32))
    } else {
        BeBuffer::new().extend(offsets.iter().map(|&offset| (offset / 2) as u16))
    };

    (glyf.into_inner(), loca.into_inner())
}

/// An `hmtx` table with one long metric per `(advance, left side bearing)` pair
pub fn hmtx(metrics: &[(u16, i16)]) -> Vec<u8> {
    let mut buffer = BeBuffer::new();
    for &(advance_width, left_side_bearing) in metrics {
        buffer = buffer.push(advance_width).push(left_side_bearing);
    }
    buffer.into_inner()
}
