use crate::AtlasBuildError;

/// Parameters that control how an atlas is rasterized and packed
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasSettings {
    /// How many pixels one unit of normalized glyph space covers.
    ///
    /// Glyph space is normalized to the larger side of the font's bounding box,
    /// not to the em square, so the tallest or widest glyph of the font spans about this many pixels.
    pub glyph_size: u32,

    /// Empty pixels between neighbouring glyphs and around the border of the atlas
    pub padding: u32,

    /// How far the distance field extends beyond the outline, relative to `glyph_size`
    pub sdf_clamp: f32,

    /// Width of the atlas image in pixels
    pub width: u32,
}

impl Default for AtlasSettings {
    fn default() -> Self {
        Self {
            glyph_size: 32,
            padding: 2,
            sdf_clamp: 0.0625,
            width: 1024,
        }
    }
}

impl AtlasSettings {
    pub fn validate(&self) -> Result<(), AtlasBuildError> {
        if self.glyph_size == 0 {
            return Err(AtlasBuildError::InvalidSettings("glyph size must not be zero"));
        }

        if !(self.sdf_clamp > 0. && self.sdf_clamp < 1.) {
            return Err(AtlasBuildError::InvalidSettings(
                "sdf clamp must be between zero and one",
            ));
        }

        if self.width <= self.padding.saturating_mul(2) {
            return Err(AtlasBuildError::InvalidSettings(
                "atlas must be wider than its padding",
            ));
        }

        Ok(())
    }

    /// The side length of the square that a single glyph is rasterized into.
    ///
    /// There is room for the distance field around the outline and one extra pixel on each side.
    #[must_use]
    pub fn tile_size(&self) -> usize {
        (self.glyph_size as f32 * (1. + 2. * self.sdf_clamp)).ceil() as usize + 2
    }

    /// Distance between the border of a tile and the outline
    #[must_use]
    pub fn tile_margin(&self) -> f32 {
        self.glyph_size as f32 * self.sdf_clamp + 1.
    }

    /// The distance field range in pixels
    #[must_use]
    pub fn clamp_distance(&self) -> f32 {
        self.glyph_size as f32 * self.sdf_clamp
    }
}
