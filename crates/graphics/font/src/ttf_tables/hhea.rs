//! [Horizontal Header](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6hhea.html) Table
//!
//! Mostly just contains information for the [hmtx](super::hmtx) table.

use crate::stream::{read_i16_at, read_u16_at, UnexpectedEof};

#[derive(Clone, Copy, Debug)]
pub struct HHEATable {
    ascender: i16,
    descender: i16,
    line_gap: i16,
    num_of_long_hor_metrics: u16,
}

impl HHEATable {
    pub fn new(data: &[u8]) -> Result<Self, UnexpectedEof> {
        Ok(Self {
            ascender: read_i16_at(data, 4)?,
            descender: read_i16_at(data, 6)?,
            line_gap: read_i16_at(data, 8)?,
            num_of_long_hor_metrics: read_u16_at(data, 34)?,
        })
    }

    #[inline]
    #[must_use]
    pub fn ascender(&self) -> i16 {
        self.ascender
    }

    /// Distance from the baseline to the lowest descender, usually negative
    #[inline]
    #[must_use]
    pub fn descender(&self) -> i16 {
        self.descender
    }

    /// The vertical distance between two baselines, in `FUnits`
    #[inline]
    #[must_use]
    pub fn line_height(&self) -> i32 {
        i32::from(self.ascender) - i32::from(self.descender) + i32::from(self.line_gap)
    }

    #[inline]
    #[must_use]
    pub fn num_of_long_hor_metrics(&self) -> usize {
        self.num_of_long_hor_metrics as usize
    }
}
