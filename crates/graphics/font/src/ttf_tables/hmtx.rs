//! [Horizontal Metrics](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6hmtx.html) table

use crate::stream::{read_i16_at, read_u16_at, UnexpectedEof};

use super::cmap::GlyphID;

#[derive(Clone, Debug)]
pub struct HMTXTable {
    long_hor_metrics: Vec<LongHorMetric>,

    /// Bearings for the glyphs past the end of `long_hor_metrics`.
    /// These share the advance width of the last long metric.
    left_side_bearings: Vec<i16>,
}

impl HMTXTable {
    pub fn new(
        data: &[u8],
        num_of_long_hor_metrics: usize,
        num_glyphs: usize,
    ) -> Result<Self, UnexpectedEof> {
        let long_hor_metrics = (0..num_of_long_hor_metrics)
            .map(|i| {
                Ok(LongHorMetric {
                    advance_width: read_u16_at(data, 4 * i)?,
                    left_side_bearing: read_i16_at(data, 4 * i + 2)?,
                })
            })
            .collect::<Result<Vec<_>, UnexpectedEof>>()?;

        // Some fonts omit the trailing bearings entirely, those default to zero
        let bearings_start = 4 * num_of_long_hor_metrics;
        let left_side_bearings = (0..num_glyphs.saturating_sub(num_of_long_hor_metrics))
            .map(|i| read_i16_at(data, bearings_start + 2 * i).unwrap_or_default())
            .collect();

        Ok(Self {
            long_hor_metrics,
            left_side_bearings,
        })
    }

    #[must_use]
    pub fn get_metric_for(&self, glyph_id: GlyphID) -> LongHorMetric {
        let index = glyph_id.numeric() as usize;
        if let Some(metric) = self.long_hor_metrics.get(index) {
            return *metric;
        }

        let advance_width = self
            .long_hor_metrics
            .last()
            .map(LongHorMetric::advance_width)
            .unwrap_or_default();
        let left_side_bearing = self
            .left_side_bearings
            .get(index - self.long_hor_metrics.len())
            .copied()
            .unwrap_or_default();

        LongHorMetric {
            advance_width,
            left_side_bearing,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LongHorMetric {
    advance_width: u16,
    left_side_bearing: i16,
}

impl LongHorMetric {
    #[inline]
    #[must_use]
    pub fn advance_width(&self) -> u16 {
        self.advance_width
    }

    #[inline]
    #[must_use]
    pub fn left_side_bearing(&self) -> i16 {
        self.left_side_bearing
    }
}
