//! [Head](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6head.html) table implementation

use crate::stream::{read_i16_at, read_u16_at, UnexpectedEof};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocaTableFormat {
    Short,
    Long,
}

#[derive(Clone, Copy, Debug)]
pub struct HeadTable {
    units_per_em: u16,

    /// The minimum x value that can be encountered while
    /// rendering a glyph from this font, in `FUnits`.
    min_x: i16,

    /// The minimum y value that can be encountered while
    /// rendering a glyph from this font, in `FUnits`.
    min_y: i16,

    /// The maximum x value that can be encountered while
    /// rendering a glyph from this font, in `FUnits`.
    max_x: i16,

    /// The maximum y value that can be encountered while
    /// rendering a glyph from this font, in `FUnits`.
    max_y: i16,

    loca_table_format: LocaTableFormat,
}

impl HeadTable {
    pub fn new(data: &[u8]) -> Result<Self, UnexpectedEof> {
        let loca_table_format = if read_i16_at(data, 50)? == 0 {
            LocaTableFormat::Short
        } else {
            LocaTableFormat::Long
        };

        Ok(Self {
            units_per_em: read_u16_at(data, 18)?,
            min_x: read_i16_at(data, 36)?,
            min_y: read_i16_at(data, 38)?,
            max_x: read_i16_at(data, 40)?,
            max_y: read_i16_at(data, 42)?,
            loca_table_format,
        })
    }

    #[inline]
    #[must_use]
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    #[inline]
    #[must_use]
    pub fn min_x(&self) -> i16 {
        self.min_x
    }

    #[inline]
    #[must_use]
    pub fn min_y(&self) -> i16 {
        self.min_y
    }

    #[inline]
    #[must_use]
    pub fn max_x(&self) -> i16 {
        self.max_x
    }

    #[inline]
    #[must_use]
    pub fn max_y(&self) -> i16 {
        self.max_y
    }

    /// The factor that maps font units into a space where the
    /// largest glyph fits inside the unit square.
    ///
    /// Falls back to `1 / units_per_em` for fonts with an empty bounding box
    /// and returns `None` if neither is usable.
    #[must_use]
    pub fn normalization_factor(&self) -> Option<f32> {
        let width = i32::from(self.max_x) - i32::from(self.min_x);
        let height = i32::from(self.max_y) - i32::from(self.min_y);
        let extent = width.max(height);

        if extent > 0 {
            Some(1. / extent as f32)
        } else if self.units_per_em != 0 {
            Some(1. / f32::from(self.units_per_em))
        } else {
            None
        }
    }

    /// Get the format of the [Loca Table](super::loca::LocaTable).
    #[inline]
    #[must_use]
    pub fn loca_table_format(&self) -> LocaTableFormat {
        self.loca_table_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(units_per_em: u16, bbox: [i16; 4], loca_format: i16) -> Vec<u8> {
        let mut data = vec![0; 54];
        data[18..20].copy_from_slice(&units_per_em.to_be_bytes());
        for (i, value) in bbox.iter().enumerate() {
            data[36 + 2 * i..38 + 2 * i].copy_from_slice(&value.to_be_bytes());
        }
        data[50..52].copy_from_slice(&loca_format.to_be_bytes());
        data
    }

    #[test]
    fn normalize_by_largest_bbox_side() {
        let table = HeadTable::new(&head(1000, [-100, -200, 900, 600], 1)).unwrap();
        assert_eq!(table.normalization_factor(), Some(1. / 1000.));
        assert_eq!(table.loca_table_format(), LocaTableFormat::Long);
    }

    #[test]
    fn empty_bbox_falls_back_to_em() {
        let table = HeadTable::new(&head(2048, [0; 4], 0)).unwrap();
        assert_eq!(table.normalization_factor(), Some(1. / 2048.));
        assert_eq!(table.loca_table_format(), LocaTableFormat::Short);

        let table = HeadTable::new(&head(0, [0; 4], 0)).unwrap();
        assert_eq!(table.normalization_factor(), None);
    }

    #[test]
    fn truncated_head_table() {
        assert!(HeadTable::new(&[0; 40]).is_err());
    }
}
