//! [CMAP](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6cmap.html) table implementation

use crate::{
    stream::{read_u16_at, read_u32_at, UnexpectedEof},
    ttf::FontOpenError,
};
use std::cmp::Ordering;

/// Zero-cost wrapper around a `u16` for extra type safety.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GlyphID(u16);

impl GlyphID {
    /// The id of the replacement glyph
    pub const REPLACEMENT: Self = Self(0);

    #[inline]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn numeric(self) -> u16 {
        self.0
    }
}

impl From<GlyphID> for u16 {
    fn from(value: GlyphID) -> Self {
        value.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformID {
    Unicode(UnicodePlatformSpecificID),
    Mac,
    Reserved,
    Microsoft(WindowsPlatformSpecificID),
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnicodePlatformSpecificID {
    Version1_0,
    Version1_1,
    Iso10646_1993SemanticDeprecated,
    Unicode2_0OrLaterBmpOnly,
    Unicode2_0OrLater,
    UnicodeVariationSequences,
    LastResort,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowsPlatformSpecificID {
    Symbol,
    UnicodeBmpOnly,
    ShiftJis,
    Prc,
    BigFive,
    Johab,
    UnicodeUcs4,
    Unknown,
}

impl PlatformID {
    /// Whether a format 12 subtable under this platform covers all of unicode
    fn has_full_unicode(&self) -> bool {
        matches!(
            self,
            Self::Unicode(UnicodePlatformSpecificID::Unicode2_0OrLater)
                | Self::Microsoft(WindowsPlatformSpecificID::UnicodeUcs4)
        )
    }

    /// Whether a format 4 subtable under this platform covers the basic multilingual plane
    fn has_bmp_unicode(&self) -> bool {
        matches!(
            self,
            Self::Unicode(UnicodePlatformSpecificID::Unicode2_0OrLaterBmpOnly)
                | Self::Microsoft(
                    WindowsPlatformSpecificID::UnicodeBmpOnly | WindowsPlatformSpecificID::Symbol
                )
        )
    }
}

impl From<(u16, u16)> for PlatformID {
    fn from(value: (u16, u16)) -> Self {
        match value.0 {
            0 => Self::Unicode(value.1.into()),
            1 => Self::Mac,
            2 => Self::Reserved,
            3 => Self::Microsoft(value.1.into()),
            _ => Self::Unknown,
        }
    }
}

impl From<u16> for UnicodePlatformSpecificID {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Version1_0,
            1 => Self::Version1_1,
            2 => Self::Iso10646_1993SemanticDeprecated,
            3 => Self::Unicode2_0OrLaterBmpOnly,
            4 => Self::Unicode2_0OrLater,
            5 => Self::UnicodeVariationSequences,
            6 => Self::LastResort,
            _ => Self::Unknown,
        }
    }
}

impl From<u16> for WindowsPlatformSpecificID {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Symbol,
            1 => Self::UnicodeBmpOnly,
            2 => Self::ShiftJis,
            3 => Self::Prc,
            4 => Self::BigFive,
            5 => Self::Johab,
            10 => Self::UnicodeUcs4,
            _ => Self::Unknown,
        }
    }
}

/// One `(platform, encoding, offset)` record from the cmap header
#[derive(Clone, Copy, Debug)]
pub struct CMAPSubTable {
    platform_id: PlatformID,
    offset: usize,
}

impl CMAPSubTable {
    fn new(data: &[u8], offset: usize) -> Result<Self, UnexpectedEof> {
        let platform_id = read_u16_at(data, offset)?;
        let platform_specific_id = read_u16_at(data, offset + 2)?;

        Ok(Self {
            platform_id: (platform_id, platform_specific_id).into(),
            offset: read_u32_at(data, offset + 4)? as usize,
        })
    }

    #[inline]
    #[must_use]
    pub fn platform_id(&self) -> PlatformID {
        self.platform_id
    }

    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Read the list of encoding records at the start of a `cmap` table
pub fn subtables(data: &[u8]) -> Result<Vec<CMAPSubTable>, UnexpectedEof> {
    let num_subtables = read_u16_at(data, 2)? as usize;

    // 4 bytes header + 8 bytes per subtable
    (0..num_subtables)
        .map(|i| CMAPSubTable::new(data, 4 + 8 * i))
        .collect()
}

/// Maps codepoints to glyph ids, using the best subtable the font provides
#[derive(Clone, Debug)]
pub enum CharacterMap {
    /// Covers all of unicode
    Format12(Format12),

    /// Covers the basic multilingual plane
    Format4(Format4),
}

impl CharacterMap {
    /// Select and parse a unicode subtable.
    ///
    /// Full unicode format 12 subtables are preferred over format 4 ones.
    pub fn new(data: &[u8]) -> Result<Self, FontOpenError> {
        let subtables = subtables(data)?;
        let format_of = |subtable: &CMAPSubTable| read_u16_at(data, subtable.offset()).ok();

        let full_unicode = subtables.iter().find(|subtable| {
            subtable.platform_id().has_full_unicode() && format_of(subtable) == Some(12)
        });
        if let Some(subtable) = full_unicode {
            log::debug!("Using format 12 cmap subtable ({:?})", subtable.platform_id());
            let subtable_data = data.get(subtable.offset()..).ok_or(UnexpectedEof)?;
            return Ok(Self::Format12(Format12::new(subtable_data)?));
        }

        let bmp_unicode = subtables.iter().find(|subtable| {
            subtable.platform_id().has_bmp_unicode() && format_of(subtable) == Some(4)
        });
        if let Some(subtable) = bmp_unicode {
            log::debug!("Using format 4 cmap subtable ({:?})", subtable.platform_id());
            let subtable_data = data.get(subtable.offset()..).ok_or(UnexpectedEof)?;
            return Ok(Self::Format4(Format4::new(subtable_data)?));
        }

        Err(FontOpenError::NoUsableCmap)
    }

    /// Find the glyph for a codepoint, falling back to [GlyphID::REPLACEMENT]
    #[must_use]
    pub fn get_glyph_id(&self, codepoint: u32) -> GlyphID {
        match self {
            Self::Format12(table) => table.get_glyph_id(codepoint),
            Self::Format4(table) => table.get_glyph_id(codepoint),
        }
        .unwrap_or(GlyphID::REPLACEMENT)
    }

    /// Call `f` for every codepoint that maps to a glyph other than [GlyphID::REPLACEMENT]
    pub fn for_each_codepoint<F: FnMut(u32, GlyphID)>(&self, f: F) {
        match self {
            Self::Format12(table) => table.codepoints(f),
            Self::Format4(table) => table.codepoints(f),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Format4 {
    segments: Vec<Format4Segment>,

    /// The id range offsets followed by the glyph id array.
    ///
    /// Id range offsets are relative to their own position, so keeping
    /// both arrays in one buffer lets us index it the same way.
    id_range_words: Vec<u16>,
}

#[derive(Clone, Copy, Debug)]
struct Format4Segment {
    start_code: u16,
    end_code: u16,
    id_delta: u16,
    id_range_offset: u16,
}

impl Format4 {
    pub fn new(data: &[u8]) -> Result<Self, UnexpectedEof> {
        // Byte layout looks like this:
        // Header        : 14 bytes
        // End Code      : [u16; segcount]
        //                 < 2 byte padding>
        // Start Code    : [u16; segcount]
        // ID Delta      : [u16; segcount]
        // ID Range Offs : [u16; segcount]
        // Glyph IDS     : remaining space

        // Some fonts lie about the length of their format 4 subtable
        let length = read_u16_at(data, 2)? as usize;
        let data = data.get(..length).unwrap_or(data);

        let segment_count_x2 = read_u16_at(data, 6)? as usize;
        let segment_count = segment_count_x2 / 2;

        let mut segments = Vec::with_capacity(segment_count);
        for i in 0..segment_count {
            segments.push(Format4Segment {
                end_code: read_u16_at(data, 14 + 2 * i)?,
                start_code: read_u16_at(data, 16 + segment_count_x2 + 2 * i)?,
                id_delta: read_u16_at(data, 16 + 2 * segment_count_x2 + 2 * i)?,
                id_range_offset: read_u16_at(data, 16 + 3 * segment_count_x2 + 2 * i)?,
            });
        }

        let id_range_start = 16 + 3 * segment_count_x2;
        let id_range_words = data
            .get(id_range_start..)
            .ok_or(UnexpectedEof)?
            .chunks_exact(2)
            .map(|word| u16::from_be_bytes([word[0], word[1]]))
            .collect();

        Ok(Self {
            segments,
            id_range_words,
        })
    }

    pub fn get_glyph_id(&self, codepoint: u32) -> Option<GlyphID> {
        let codepoint = u16::try_from(codepoint).ok()?;

        // Find the segment containing the glyph index
        let segment_index = self
            .segments
            .binary_search_by(|segment| {
                if segment.start_code > codepoint {
                    Ordering::Greater
                } else if segment.end_code >= codepoint {
                    Ordering::Equal
                } else {
                    Ordering::Less
                }
            })
            .ok()?;

        Some(self.glyph_in_segment(segment_index, codepoint))
    }

    fn glyph_in_segment(&self, segment_index: usize, codepoint: u16) -> GlyphID {
        let segment = self.segments[segment_index];

        // The delta is added, never subtracted, modulo 65536 as the TrueType format defines it
        if segment.id_range_offset == 0 {
            return GlyphID(codepoint.wrapping_add(segment.id_delta));
        }

        // The offset is relative to the segment's own id range offset word
        let index = segment_index
            + segment.id_range_offset as usize / 2
            + (codepoint - segment.start_code) as usize;

        match self.id_range_words.get(index) {
            Some(0) | None => GlyphID::REPLACEMENT,
            Some(&glyph_id) => GlyphID(glyph_id.wrapping_add(segment.id_delta)),
        }
    }

    /// Call `f` for every codepoint defined in the font
    pub fn codepoints<F: FnMut(u32, GlyphID)>(&self, mut f: F) {
        for (segment_index, segment) in self.segments.iter().enumerate() {
            // Indicates the final segment
            if segment.start_code == 0xFFFF {
                break;
            }

            for codepoint in segment.start_code..=segment.end_code {
                let glyph_id = self.glyph_in_segment(segment_index, codepoint);
                if glyph_id != GlyphID::REPLACEMENT {
                    f(u32::from(codepoint), glyph_id);
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Format12 {
    groups: Vec<SequentialMapGroup>,
}

#[derive(Clone, Copy, Debug)]
struct SequentialMapGroup {
    start_char_code: u32,
    end_char_code: u32,
    start_glyph_id: u32,
}

impl SequentialMapGroup {
    fn glyph_for(&self, codepoint: u32) -> Option<GlyphID> {
        let glyph_id = self
            .start_glyph_id
            .checked_add(codepoint - self.start_char_code)?;
        u16::try_from(glyph_id).ok().map(GlyphID)
    }
}

impl Format12 {
    pub fn new(data: &[u8]) -> Result<Self, UnexpectedEof> {
        // Header: format (u16), reserved (u16), length (u32), language (u32), num groups (u32)
        let num_groups = read_u32_at(data, 12)? as usize;

        let groups = (0..num_groups)
            .map(|i| {
                let offset = 16 + 12 * i;
                Ok(SequentialMapGroup {
                    start_char_code: read_u32_at(data, offset)?,
                    end_char_code: read_u32_at(data, offset + 4)?,
                    start_glyph_id: read_u32_at(data, offset + 8)?,
                })
            })
            .collect::<Result<_, UnexpectedEof>>()?;

        Ok(Self { groups })
    }

    pub fn get_glyph_id(&self, codepoint: u32) -> Option<GlyphID> {
        let group_index = self
            .groups
            .binary_search_by(|group| {
                if group.start_char_code > codepoint {
                    Ordering::Greater
                } else if group.end_char_code >= codepoint {
                    Ordering::Equal
                } else {
                    Ordering::Less
                }
            })
            .ok()?;

        self.groups[group_index].glyph_for(codepoint)
    }

    /// Call `f` for every codepoint defined in the font
    pub fn codepoints<F: FnMut(u32, GlyphID)>(&self, mut f: F) {
        const MAX_CODEPOINT: u32 = 0x10FFFF;

        for group in &self.groups {
            let end = group.end_char_code.min(MAX_CODEPOINT);
            for codepoint in group.start_char_code..=end {
                match group.glyph_for(codepoint) {
                    Some(GlyphID::REPLACEMENT) => {},
                    Some(glyph_id) => f(codepoint, glyph_id),
                    None => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use font_test_data::cmap::{self, Segment};

    #[test]
    fn format4_delta_segments() {
        let data = cmap::format4(&[
            Segment::delta(0x41, 0x43, 3),
            Segment::delta(0x61, 0x61, 10),
        ]);
        let table = Format4::new(&data).unwrap();

        assert_eq!(table.get_glyph_id(0x41), Some(GlyphID::new(3)));
        assert_eq!(table.get_glyph_id(0x43), Some(GlyphID::new(5)));
        assert_eq!(table.get_glyph_id(0x61), Some(GlyphID::new(10)));
        assert_eq!(table.get_glyph_id(0x44), None);
        assert_eq!(table.get_glyph_id(0x1F600), None);
    }

    #[test]
    fn format4_delta_wraps_around() {
        // Stored delta is 36, so the glyph id overflows past 65535
        let data = cmap::format4(&[Segment::delta(0xFFF0, 0xFFF1, 20)]);
        let table = Format4::new(&data).unwrap();

        assert_eq!(table.get_glyph_id(0xFFF0), Some(GlyphID::new(20)));
        assert_eq!(table.get_glyph_id(0xFFF1), Some(GlyphID::new(21)));
    }

    #[test]
    fn format4_glyph_id_array() {
        let data = cmap::format4(&[
            Segment::delta(0x20, 0x20, 1),
            Segment::array(0x30, &[7, 0, 9]),
        ]);
        let table = Format4::new(&data).unwrap();

        assert_eq!(table.get_glyph_id(0x20), Some(GlyphID::new(1)));
        assert_eq!(table.get_glyph_id(0x30), Some(GlyphID::new(7)));
        assert_eq!(table.get_glyph_id(0x31), Some(GlyphID::REPLACEMENT));
        assert_eq!(table.get_glyph_id(0x32), Some(GlyphID::new(9)));

        let mut codepoints = vec![];
        table.codepoints(|codepoint, glyph_id| codepoints.push((codepoint, glyph_id.numeric())));
        assert_eq!(codepoints, [(0x20, 1), (0x30, 7), (0x32, 9)]);
    }

    #[test]
    fn format4_without_segments() {
        let table = Format4::new(&cmap::format4(&[])).unwrap();
        assert_eq!(table.get_glyph_id(0x41), None);
        assert_eq!(table.get_glyph_id(0xFFFF), Some(GlyphID::REPLACEMENT));
    }

    #[test]
    fn format12_groups() {
        let data = cmap::format12(&[(0x41, 0x42, 3), (0x1F600, 0x1F601, 20)]);
        let table = Format12::new(&data).unwrap();

        assert_eq!(table.get_glyph_id(0x42), Some(GlyphID::new(4)));
        assert_eq!(table.get_glyph_id(0x1F601), Some(GlyphID::new(21)));
        assert_eq!(table.get_glyph_id(0x1F602), None);
        assert_eq!(table.get_glyph_id(0), None);
    }

    #[test]
    fn prefer_full_unicode_subtable() {
        let data = cmap::table(&[
            (3, 1, cmap::format4(&[Segment::delta(0x41, 0x41, 1)])),
            (3, 10, cmap::format12(&[(0x41, 0x41, 2)])),
        ]);
        let character_map = CharacterMap::new(&data).unwrap();

        assert!(matches!(character_map, CharacterMap::Format12(_)));
        assert_eq!(character_map.get_glyph_id(0x41), GlyphID::new(2));
        assert_eq!(character_map.get_glyph_id(0x42), GlyphID::REPLACEMENT);
    }

    #[test]
    fn fall_back_to_bmp_subtable() {
        let data = cmap::table(&[(0, 3, cmap::format4(&[Segment::delta(0x41, 0x41, 1)]))]);
        let character_map = CharacterMap::new(&data).unwrap();
        assert!(matches!(character_map, CharacterMap::Format4(_)));
    }

    #[test]
    fn reject_fonts_without_unicode_subtable() {
        // A mac roman subtable is not good enough
        let data = cmap::table(&[(1, 0, cmap::format4(&[Segment::delta(0x41, 0x41, 1)]))]);
        assert!(matches!(
            CharacterMap::new(&data),
            Err(FontOpenError::NoUsableCmap)
        ));
    }
}
