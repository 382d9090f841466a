//! [Loca](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6loca.html) table implementation.

use crate::stream::{read_u16_at, read_u32_at, UnexpectedEof};

use super::{cmap::GlyphID, head::LocaTableFormat};
use std::ops::Range;

/// The offsets of every glyph inside the [glyf](super::glyf) table.
#[derive(Clone, Debug)]
pub struct LocaTable {
    /// `num_glyphs + 1` offsets, the last one marks the end of the final glyph
    offsets: Vec<u32>,
}

impl LocaTable {
    pub fn new(
        data: &[u8],
        format: LocaTableFormat,
        num_glyphs: usize,
    ) -> Result<Self, UnexpectedEof> {
        let offsets = (0..=num_glyphs)
            .map(|i| match format {
                // Short tables store offset / 2 as a u16
                LocaTableFormat::Short => read_u16_at(data, 2 * i).map(|offset| u32::from(offset) * 2),
                LocaTableFormat::Long => read_u32_at(data, 4 * i),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { offsets })
    }

    #[inline]
    #[must_use]
    pub fn num_glyphs(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// The byte range of a glyph within the `glyf` table.
    ///
    /// Glyphs without an outline (like a space) have an empty range.
    /// Returns `None` if the glyph is out of range or its offsets are not ascending.
    #[must_use]
    pub fn get_glyph_location(&self, glyph_id: GlyphID) -> Option<Range<usize>> {
        let index = glyph_id.numeric() as usize;
        let start = *self.offsets.get(index)? as usize;
        let end = *self.offsets.get(index + 1)? as usize;

        (start <= end).then_some(start..end)
    }
}
