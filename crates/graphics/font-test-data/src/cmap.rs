//! Builders for `cmap` tables and their subtables

use crate::be_buffer;

/// A single segment of a format 4 subtable
#[derive(Clone, Debug)]
pub enum Segment {
    /// Maps `start..=end` onto consecutive glyph ids, starting at `first_glyph`
    Delta { start: u16, end: u16, first_glyph: u16 },

    /// Maps the codepoints starting at `start` onto explicit glyph ids,
    /// through the glyph id array
    Array { start: u16, glyphs: Vec<u16> },
}

impl Segment {
    pub fn delta(start: u16, end: u16, first_glyph: u16) -> Self {
        Self::Delta {
            start,
            end,
            first_glyph,
        }
    }

    pub fn array(start: u16, glyphs: &[u16]) -> Self {
        assert!(!glyphs.is_empty());
        Self::Array {
            start,
            glyphs: glyphs.to_vec(),
        }
    }

    fn start(&self) -> u16 {
        match self {
            Self::Delta { start, .. } | Self::Array { start, .. } => *start,
        }
    }

    fn end(&self) -> u16 {
        match self {
            Self::Delta { end, .. } => *end,
            Self::Array { start, glyphs } => start + glyphs.len() as u16 - 1,
        }
    }
}

/// `searchRange`, `entrySelector` and `rangeShift` for a binary search over `count` items of `size` bytes
fn search_params(count: u16, size: u16) -> (u16, u16, u16) {
    let mut entry_selector = 0;
    while (1 << (entry_selector + 1)) <= count {
        entry_selector += 1;
    }
    let search_range = (1 << entry_selector) * size;
    let range_shift = count * size - search_range;
    (search_range, entry_selector, range_shift)
}

/// Encode a format 4 subtable. The closing `0xFFFF` segment is added automatically.
///
/// Segments must be sorted and must not overlap.
pub fn format4(segments: &[Segment]) -> Vec<u8> {
    let segment_count = segments.len() + 1;
    let (search_range, entry_selector, range_shift) = search_params(segment_count as u16, 2);

    let mut end_codes = vec![];
    let mut start_codes = vec![];
    let mut id_deltas = vec![];
    let mut id_range_offsets = vec![];
    let mut glyph_id_array = vec![];

    for (i, segment) in segments.iter().enumerate() {
        start_codes.push(segment.start());
        end_codes.push(segment.end());

        match segment {
            Segment::Delta {
                start, first_glyph, ..
            } => {
                id_deltas.push(first_glyph.wrapping_sub(*start));
                id_range_offsets.push(0);
            },
            Segment::Array { glyphs, .. } => {
                // Relative to the location of this segment's id range offset
                id_deltas.push(0);
                id_range_offsets
                    .push(2 * (segment_count - i) as u16 + 2 * glyph_id_array.len() as u16);
                glyph_id_array.extend_from_slice(glyphs);
            },
        }
    }

    start_codes.push(0xFFFF);
    end_codes.push(0xFFFF);
    id_deltas.push(1);
    id_range_offsets.push(0);

    let length = 16 + 8 * segment_count + 2 * glyph_id_array.len();
    be_buffer! {
        4_u16,                        // format
        length as u16,                // length
        0_u16,                        // language
        2 * segment_count as u16,     // segCountX2
        search_range,
        entry_selector,
        range_shift,
    }
    .extend(end_codes)
    .push(0_u16) // reservedPad
    .extend(start_codes)
    .extend(id_deltas)
    .extend(id_range_offsets)
    .extend(glyph_id_array)
    .into_inner()
}

/// Encode a format 12 subtable from `(start_char, end_char, start_glyph)` groups
pub fn format12(groups: &[(u32, u32, u32)]) -> Vec<u8> {
    let length = 16 + 12 * groups.len() as u32;
    let mut buffer = be_buffer! {
        12_u16,                   // format
        0_u16,                    // reserved
        length,
        0_u32,                    // language
        groups.len() as u32,      // numGroups
    };

    for &(start_char, end_char, start_glyph) in groups {
        buffer = buffer.push(start_char).push(end_char).push(start_glyph);
    }
    buffer.into_inner()
}

/// Encode a complete `cmap` table from `(platform, encoding, subtable)` records
pub fn table(subtables: &[(u16, u16, Vec<u8>)]) -> Vec<u8> {
    let mut buffer = be_buffer! {
        0_u16,                    // version
        subtables.len() as u16,   // numTables
    };

    let mut offset = 4 + 8 * subtables.len() as u32;
    for (platform_id, encoding_id, subtable) in subtables {
        buffer = buffer.push(*platform_id).push(*encoding_id).push(offset);
        offset += subtable.len() as u32;
    }

    for (_, _, subtable) in subtables {
        buffer = buffer.extend_from_slice(subtable);
    }
    buffer.into_inner()
}
