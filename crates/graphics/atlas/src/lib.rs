//! Glyph atlases: many signed distance field glyphs packed into a single
//! grayscale image, plus the tables that locate each glyph in it.
//!
//! Building an atlas is expensive, so atlases can be [saved](GlyphAtlas::save) to a
//! compact binary cache and [loaded](GlyphAtlas::load) again later.

mod builder;
mod packer;
mod serialize;
mod settings;

pub use builder::AtlasBuildError;
pub use packer::{RectangleTooWide, ShelfPacker};
pub use serialize::{AtlasIoError, FORMAT_VERSION, MAGIC};
pub use settings::AtlasSettings;

use math::Vec2D;

use std::{cmp::Ordering, fs, ops::RangeInclusive, path::Path};

/// A run of consecutive codepoints that all have glyphs in the atlas.
///
/// The glyph for `codepoint` is at `indices[codepoint + offset]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodepointRange {
    /// First codepoint in the range
    pub start: u32,

    /// Last codepoint in the range (inclusive)
    pub end: u32,
    pub offset: i32,
}

impl CodepointRange {
    #[inline]
    #[must_use]
    pub fn contains(&self, codepoint: u32) -> bool {
        (self.start..=self.end).contains(&codepoint)
    }

    /// The position of `codepoint` in the glyph index table
    #[inline]
    #[must_use]
    pub fn index_of(&self, codepoint: u32) -> usize {
        (i64::from(codepoint) + i64::from(self.offset)) as usize
    }
}

/// Where a glyph is stored in the atlas and how to place it.
///
/// Apart from the texture coordinates, everything is measured in
/// normalized glyph space, where the largest glyph of the font is `1` unit tall.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphIndex {
    /// Top left corner of the glyph in the atlas, as a fraction of the atlas size
    pub uv_position: Vec2D,

    /// Size of the glyph in the atlas, as a fraction of the atlas size
    pub uv_size: Vec2D,

    /// Size of the rasterized glyph including its distance field halo
    pub size: Vec2D,

    /// Offset from the pen position to the top left corner of the glyph.
    ///
    /// `y` points up, away from the baseline.
    pub bearing: Vec2D,

    /// Horizontal distance to the next pen position
    pub advance: f32,
}

impl GlyphIndex {
    /// Whether there is anything to draw for this glyph, whitespace has no extent
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size.x == 0. || self.size.y == 0.
    }
}

/// Identifies the font file an atlas was built from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FontFingerprint {
    /// Size of the font file in bytes
    pub length: u64,
    pub checksum: u32,
}

impl FontFingerprint {
    #[must_use]
    pub fn of(font_data: &[u8]) -> Self {
        Self {
            length: font_data.len() as u64,
            checksum: hash::crc32(font_data),
        }
    }
}

/// Everything an atlas was built from.
///
/// A cached atlas is only reused if it was built from exactly the same inputs.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildInputs {
    pub settings: AtlasSettings,
    pub font: FontFingerprint,

    /// The codepoint ranges that were asked for, in the order they were given.
    ///
    /// This includes codepoints that the font has no glyph for.
    pub requested_ranges: Vec<RangeInclusive<u32>>,
}

/// A signed distance field atlas of glyphs.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphAtlas {
    width: u32,
    height: u32,
    line_height: f32,

    /// The size of one unit of glyph space in atlas pixels
    glyph_scale: f32,

    /// Sorted and non-overlapping
    ranges: Vec<CodepointRange>,

    /// Index `0` is the glyph for missing codepoints
    indices: Vec<GlyphIndex>,

    /// `width * height` distance values, row by row from the top
    image: Vec<u8>,

    inputs: BuildInputs,
}

impl GlyphAtlas {
    /// Build an atlas for the given codepoints of the font at `font_path`.
    ///
    /// This is a shorthand for [GlyphAtlas::from_settings].
    pub fn create<P: AsRef<Path>>(
        font_path: P,
        glyph_pixel_size: u32,
        padding_pixels: u32,
        sdf_clamp: f32,
        atlas_width: u32,
        codepoint_ranges: &[RangeInclusive<u32>],
    ) -> Result<Self, AtlasBuildError> {
        let font = font::Font::open(font_path)?;
        let settings = AtlasSettings {
            glyph_size: glyph_pixel_size,
            padding: padding_pixels,
            sdf_clamp,
            width: atlas_width,
        };

        Self::from_settings(&font, &settings, codepoint_ranges)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The distance between two baselines in normalized glyph space
    #[must_use]
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    #[must_use]
    pub fn glyph_scale(&self) -> f32 {
        self.glyph_scale
    }

    #[must_use]
    pub fn ranges(&self) -> &[CodepointRange] {
        &self.ranges
    }

    #[must_use]
    pub fn indices(&self) -> &[GlyphIndex] {
        &self.indices
    }

    /// The grayscale atlas image, row by row from the top.
    ///
    /// Values above `127` are inside a glyph.
    #[must_use]
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    #[must_use]
    pub fn build_inputs(&self) -> &BuildInputs {
        &self.inputs
    }

    /// The glyph that is drawn when a codepoint is not part of the atlas
    #[must_use]
    pub fn missing_glyph(&self) -> GlyphIndex {
        self.indices.first().copied().unwrap_or_default()
    }

    /// Look up the glyph for a codepoint.
    ///
    /// Codepoints that are not part of the atlas get the [missing glyph](Self::missing_glyph).
    #[must_use]
    pub fn query(&self, codepoint: u32) -> GlyphIndex {
        let search = self.ranges.binary_search_by(|range| {
            if range.end < codepoint {
                Ordering::Less
            } else if range.start > codepoint {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        });

        match search {
            Ok(range_index) => {
                let index = self.ranges[range_index].index_of(codepoint);
                self.indices
                    .get(index)
                    .copied()
                    .unwrap_or_else(|| self.missing_glyph())
            },
            Err(_) => self.missing_glyph(),
        }
    }

    /// Write the atlas image to a `.bmp` file, for debugging
    pub fn save_as_image<P: AsRef<Path>>(
        &self,
        path: P,
        overwrite: bool,
    ) -> Result<(), image::bmp::Error> {
        image::bmp::save(
            path,
            self.width,
            self.height,
            |x, y| {
                let value = self.image[(y * self.width + x) as usize];
                [value; 3]
            },
            overwrite,
        )
    }

    /// Load a cached atlas, or build and cache it if the cache can't be used.
    ///
    /// Caches that are missing, corrupt or from a different format version are rebuilt.
    /// So are caches built from a different font, different settings or different codepoint ranges.
    pub fn load_or_create<P, Q>(
        cache_path: P,
        font_path: Q,
        settings: &AtlasSettings,
        codepoint_ranges: &[RangeInclusive<u32>],
    ) -> Result<Self, AtlasBuildError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let cache_path = cache_path.as_ref();

        let font_data = fs::read(font_path).map_err(font::FontOpenError::from)?;
        let inputs = BuildInputs {
            settings: *settings,
            font: FontFingerprint::of(&font_data),
            requested_ranges: codepoint_ranges.to_vec(),
        };

        match Self::load(cache_path) {
            Ok(atlas) if atlas.inputs == inputs => {
                log::info!("Using cached glyph atlas {}", cache_path.display());
                return Ok(atlas);
            },
            Ok(_) => {
                log::warn!(
                    "Cached glyph atlas {} was built from a different font, settings or codepoints",
                    cache_path.display()
                );
            },
            Err(error) => {
                log::warn!(
                    "Cannot use cached glyph atlas {}: {error}",
                    cache_path.display()
                );
            },
        }

        let font = font::Font::from_bytes(font_data)?;
        let atlas = Self::from_settings(&font, settings, codepoint_ranges)?;

        if let Err(error) = atlas.save(cache_path, true) {
            log::warn!(
                "Failed to write glyph atlas cache {}: {error}",
                cache_path.display()
            );
        }

        Ok(atlas)
    }
}
