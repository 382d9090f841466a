//! [MaxP](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6maxp.html) table implementation.

use crate::stream::{read_u16_at, read_u32_at, UnexpectedEof};

#[derive(Clone, Copy, Debug)]
pub struct MaxPTable {
    /// Number of glyphs defined in the font
    pub num_glyphs: u16,

    /// Maximum levels of recursion in composite glyphs
    ///
    /// Zero for version 0.5 tables, which don't store this value.
    pub max_component_depth: u16,
}

impl MaxPTable {
    pub fn new(data: &[u8]) -> Result<Self, UnexpectedEof> {
        let version = read_u32_at(data, 0)?;
        let num_glyphs = read_u16_at(data, 4)?;

        let max_component_depth = if version == 0x0001_0000 {
            read_u16_at(data, 30)?
        } else {
            0
        };

        Ok(Self {
            num_glyphs,
            max_component_depth,
        })
    }
}
