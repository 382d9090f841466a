//! Rasterizing and packing glyphs into an atlas.

use crate::{
    AtlasSettings, BuildInputs, CodepointRange, FontFingerprint, GlyphAtlas, GlyphIndex,
    ShelfPacker,
};

use font::{Font, FontOpenError, GlyphDecodeError, GlyphID};
use math::{AffineTransform, Bitmap, Rectangle, Vec2D};
use rayon::prelude::*;
use thiserror::Error;

use std::{cmp::Reverse, ops::RangeInclusive};

/// The largest valid unicode codepoint
const MAX_CODEPOINT: u32 = char::MAX as u32;

#[derive(Debug, Error)]
pub enum AtlasBuildError {
    #[error("failed to open font")]
    Font(#[from] FontOpenError),

    #[error("invalid atlas settings: {0}")]
    InvalidSettings(&'static str),

    #[error("glyph {glyph_id:?} (U+{codepoint:04X}) is {width} pixels wide but the atlas only has room for {max_width}")]
    GlyphTooWide {
        codepoint: u32,
        glyph_id: GlyphID,
        width: u32,
        max_width: u32,
    },

    #[error("failed to decode glyph {glyph_id:?}")]
    Decode {
        glyph_id: GlyphID,
        source: GlyphDecodeError,
    },
}

/// The distance field of a single glyph
#[derive(Clone, Debug)]
struct Tile {
    glyph_id: GlyphID,

    /// Row `0` is the bottom of the glyph
    distances: Bitmap<u8>,

    /// The pixels that are within the distance field range, `None` for whitespace
    ink: Option<Rectangle<usize>>,

    /// Where the outline was before it was moved to the origin
    origin: Vec2D,
    advance: f32,
}

/// Where the ink of a tile ends up in the atlas
#[derive(Clone, Copy, Debug)]
struct Placement {
    ink: Rectangle<usize>,
    slot: Rectangle<u32>,
}

impl Tile {
    fn rasterize(
        font: &Font,
        glyph_id: GlyphID,
        settings: &AtlasSettings,
    ) -> Result<Self, AtlasBuildError> {
        let outline = font
            .decode_glyph(glyph_id)
            .map_err(|source| AtlasBuildError::Decode { glyph_id, source })?;

        let size = settings.tile_size();
        let scale = settings.glyph_size as f32;
        let margin = settings.tile_margin();
        let transform = AffineTransform::scale(scale, scale)
            .chain(AffineTransform::translate(Vec2D::new(margin, margin)));

        let field = sdf::signed_distance_field(&outline, transform, size, size);
        let distances = sdf::quantize(&field, settings.clamp_distance());
        let ink = ink_bounds(&distances);

        Ok(Self {
            glyph_id,
            distances,
            ink,
            origin: outline.origin(),
            advance: outline.metrics().advance_width,
        })
    }

    fn height(&self) -> usize {
        self.ink.map_or(0, |ink| ink.height())
    }

    fn glyph_index(
        &self,
        placement: Option<Placement>,
        settings: &AtlasSettings,
        atlas_size: Vec2D,
    ) -> GlyphIndex {
        let Some(Placement { ink, slot }) = placement else {
            return GlyphIndex {
                advance: self.advance,
                ..Default::default()
            };
        };

        let scale = settings.glyph_size as f32;
        let margin = settings.tile_margin();
        let size = Vec2D::new(ink.width() as f32, ink.height() as f32);
        let position = slot.top_left().map(|value| value as f32);

        GlyphIndex {
            uv_position: Vec2D::new(position.x / atlas_size.x, position.y / atlas_size.y),
            uv_size: Vec2D::new(size.x / atlas_size.x, size.y / atlas_size.y),
            size: size / scale,
            bearing: Vec2D::new(
                (ink.top_left().x as f32 - margin) / scale + self.origin.x,
                (ink.bottom_right().y as f32 - margin) / scale + self.origin.y,
            ),
            advance: self.advance,
        }
    }
}

/// The smallest rectangle containing all nonzero pixels
fn ink_bounds(distances: &Bitmap<u8>) -> Option<Rectangle<usize>> {
    let mut bounds: Option<Rectangle<usize>> = None;

    for y in 0..distances.height() {
        for (x, &value) in distances.row(y).iter().enumerate() {
            if value == 0 {
                continue;
            }

            let pixel = Rectangle::from_position_and_size(Vec2D::new(x, y), 1, 1);
            match bounds.as_mut() {
                Some(bounds) => bounds.grow_to_contain(pixel),
                None => bounds = Some(pixel),
            }
        }
    }

    bounds
}

/// Flatten the ranges into a sorted list of codepoints without duplicates
fn expand_ranges(ranges: &[RangeInclusive<u32>]) -> Vec<u32> {
    let mut codepoints: Vec<u32> = ranges
        .iter()
        .flat_map(|range| *range.start()..=(*range.end()).min(MAX_CODEPOINT))
        .collect();

    codepoints.sort_unstable();
    codepoints.dedup();
    codepoints
}

/// Copy the ink of a tile into the atlas, flipping it so the top of the glyph comes first
fn blit(tile: &Tile, placement: Placement, atlas: &mut Bitmap<u8>) {
    let Placement { ink, slot } = placement;
    let atlas_width = atlas.width();
    let left = slot.top_left().x as usize;
    let top = slot.top_left().y as usize;

    for row in 0..ink.height() {
        let source_row = tile.distances.row(ink.top_left().y + row);
        let source = &source_row[ink.top_left().x..ink.bottom_right().x];
        let start = (top + ink.height() - 1 - row) * atlas_width + left;
        atlas.data_mut()[start..start + ink.width()].copy_from_slice(source);
    }
}

/// Merge consecutive codepoints into ranges.
///
/// The glyph for the codepoint at position `i` is stored at index `i + 1`, since
/// index `0` is reserved for the missing glyph.
fn coalesce(codepoints: impl Iterator<Item = u32>) -> Vec<CodepointRange> {
    let mut ranges: Vec<CodepointRange> = vec![];

    for (position, codepoint) in codepoints.enumerate() {
        match ranges.last_mut() {
            Some(range) if range.end.checked_add(1) == Some(codepoint) => range.end = codepoint,
            _ => ranges.push(CodepointRange {
                start: codepoint,
                end: codepoint,
                offset: (position as i64 + 1 - i64::from(codepoint)) as i32,
            }),
        }
    }

    ranges
}

impl GlyphAtlas {
    /// Rasterize the glyphs for all codepoints in `codepoint_ranges` and pack them into an atlas.
    ///
    /// Codepoints without a glyph in the font are left out, they resolve to the missing glyph.
    pub fn from_settings(
        font: &Font,
        settings: &AtlasSettings,
        codepoint_ranges: &[RangeInclusive<u32>],
    ) -> Result<Self, AtlasBuildError> {
        settings.validate()?;

        let mapped: Vec<(u32, GlyphID)> = expand_ranges(codepoint_ranges)
            .into_iter()
            .map(|codepoint| (codepoint, font.glyph_id(codepoint)))
            .filter(|&(_, glyph_id)| glyph_id != GlyphID::REPLACEMENT)
            .collect();

        // Multiple codepoints may share one glyph
        let mut glyph_ids: Vec<GlyphID> = mapped.iter().map(|&(_, glyph_id)| glyph_id).collect();
        glyph_ids.push(GlyphID::REPLACEMENT);
        glyph_ids.sort_unstable();
        glyph_ids.dedup();

        let tiles = glyph_ids
            .par_iter()
            .map(|&glyph_id| Tile::rasterize(font, glyph_id, settings))
            .collect::<Result<Vec<Tile>, AtlasBuildError>>()?;

        // Tallest glyphs first, so shelves are filled evenly
        let mut order: Vec<usize> = (0..tiles.len()).collect();
        order.sort_by_key(|&index| Reverse(tiles[index].height()));

        let mut packer = ShelfPacker::new(settings.width, settings.padding);
        let mut placements: Vec<Option<Placement>> = vec![None; tiles.len()];
        for index in order {
            let tile = &tiles[index];
            let Some(ink) = tile.ink else {
                continue;
            };

            let slot = packer
                .pack(ink.width() as u32, ink.height() as u32)
                .map_err(|error| AtlasBuildError::GlyphTooWide {
                    codepoint: mapped
                        .iter()
                        .find(|&&(_, glyph_id)| glyph_id == tile.glyph_id)
                        .map_or(0, |&(codepoint, _)| codepoint),
                    glyph_id: tile.glyph_id,
                    width: error.width,
                    max_width: error.max_width,
                })?;
            placements[index] = Some(Placement { ink, slot });
        }

        let width = settings.width;
        let height = packer.height();
        let mut image = Bitmap::new(width as usize, height as usize);
        for (tile, placement) in tiles.iter().zip(&placements) {
            if let Some(placement) = placement {
                blit(tile, *placement, &mut image);
            }
        }

        let atlas_size = Vec2D::new(width as f32, height as f32);
        let glyph_index_of = |glyph_id: GlyphID| {
            // Every mapped glyph has a tile
            let tile_index = glyph_ids.binary_search(&glyph_id).unwrap_or(0);
            tiles[tile_index].glyph_index(placements[tile_index], settings, atlas_size)
        };

        let indices: Vec<GlyphIndex> = std::iter::once(GlyphID::REPLACEMENT)
            .chain(mapped.iter().map(|&(_, glyph_id)| glyph_id))
            .map(glyph_index_of)
            .collect();
        let ranges = coalesce(mapped.iter().map(|&(codepoint, _)| codepoint));

        log::info!(
            "Built {width}x{height} glyph atlas with {} glyphs for {} codepoints in {} ranges",
            tiles.len(),
            mapped.len(),
            ranges.len()
        );

        Ok(Self {
            width,
            height,
            line_height: font.line_height(),
            glyph_scale: settings.glyph_size as f32,
            ranges,
            indices,
            image: image.into_data(),
            inputs: BuildInputs {
                settings: *settings,
                font: FontFingerprint::of(font.data()),
                requested_ranges: codepoint_ranges.to_vec(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_and_sort_ranges() {
        assert_eq!(expand_ranges(&[5..=7, 1..=2, 6..=8]), vec![1, 2, 5, 6, 7, 8]);
        assert_eq!(expand_ranges(&[3..=1]), Vec::<u32>::new());
        assert_eq!(
            expand_ranges(&[0x10FFFE..=u32::MAX]),
            vec![0x10FFFE, 0x10FFFF]
        );
    }

    #[test]
    fn coalesce_codepoints() {
        let ranges = coalesce([65, 66, 67, 70, 0x1F600].into_iter());
        assert_eq!(
            ranges,
            vec![
                CodepointRange {
                    start: 65,
                    end: 67,
                    offset: -64
                },
                CodepointRange {
                    start: 70,
                    end: 70,
                    offset: -66
                },
                CodepointRange {
                    start: 0x1F600,
                    end: 0x1F600,
                    offset: 5 - 0x1F600
                },
            ]
        );

        // Every codepoint resolves to its position plus one
        assert_eq!(ranges[0].index_of(65), 1);
        assert_eq!(ranges[0].index_of(67), 3);
        assert_eq!(ranges[1].index_of(70), 4);
        assert_eq!(ranges[2].index_of(0x1F600), 5);
    }

    #[test]
    fn ink_of_a_bitmap() {
        let mut bitmap = Bitmap::new(6, 5);
        assert_eq!(ink_bounds(&bitmap), None);

        bitmap.set_pixel(1, 3, 10);
        bitmap.set_pixel(4, 1, 255);
        let bounds = ink_bounds(&bitmap).unwrap();
        assert_eq!(bounds.top_left(), Vec2D::new(1, 1));
        assert_eq!(bounds.bottom_right(), Vec2D::new(5, 4));
    }
}
