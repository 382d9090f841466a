//! [TrueType](https://developer.apple.com/fonts/TrueType-Reference-Manual) font parser
//!
//! ## Reference Material:
//! * <https://learn.microsoft.com/en-us/typography/opentype/spec/otff>
//! * <https://formats.kaitai.io/ttf/index.html>
//! * <https://handmade.network/forums/articles/t/7330-implementing_a_font_reader_and_rasterizer_from_scratch%252C_part_1__ttf_font_reader>

use std::{fmt, fs, io, ops::Range, path::Path};

use math::AffineTransform;
use thiserror::Error;

use crate::{
    outline::{GlyphMetrics, GlyphOutline},
    stream::UnexpectedEof,
    ttf_tables::{
        cmap::{CharacterMap, GlyphID},
        glyf::{ComponentPlacement, CompoundGlyph, Glyph},
        head::HeadTable,
        hhea::HHEATable,
        hmtx::HMTXTable,
        loca::LocaTable,
        maxp::MaxPTable,
        offset::{OffsetTable, Tag},
    },
};

/// Composite glyphs may always nest at least this deep, even if `maxp` claims otherwise
const MIN_COMPONENT_DEPTH: u16 = 8;

/// Hard limit on composite glyph nesting, regardless of what `maxp` claims
const MAX_COMPONENT_DEPTH: u16 = 64;

#[derive(Debug, Error)]
pub enum FontOpenError {
    #[error("failed to read font file")]
    Io(#[from] io::Error),

    #[error("not a truetype or opentype font (signature {0:#010x})")]
    InvalidSignature(u32),

    #[error("font is missing the required {0} table")]
    MissingTable(Tag),

    #[error("font has no unicode character map")]
    NoUsableCmap,

    #[error(transparent)]
    UnexpectedEof(#[from] UnexpectedEof),

    #[error("the {0} table is malformed")]
    MalformedTable(Tag),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GlyphDecodeError {
    #[error(transparent)]
    UnexpectedEof(#[from] UnexpectedEof),

    #[error("glyph flags expand to {decoded} points, expected {expected}")]
    MalformedFlags { expected: usize, decoded: usize },

    #[error("contour end points are not strictly increasing")]
    InvalidContourEnds,

    #[error("composite glyph {glyph_id:?} nests deeper than {limit} levels")]
    CompositeTooDeep { glyph_id: GlyphID, limit: u16 },

    #[error("composite glyph references nonexistent glyph {0:?}")]
    ComponentOutOfRange(GlyphID),

    #[error("cannot align point {child_point} of a component with point {parent_point}")]
    PointMatchOutOfRange { parent_point: u32, child_point: u32 },
}

/// A parsed font file.
///
/// The font owns its data and never modifies it after opening.
pub struct Font {
    data: Vec<u8>,
    offset_table: OffsetTable,
    head_table: HeadTable,
    hhea_table: HHEATable,
    hmtx_table: HMTXTable,
    maxp_table: MaxPTable,
    loca_table: LocaTable,
    character_map: CharacterMap,

    /// The location of the `glyf` table within `data`
    glyf_range: Range<usize>,

    /// Maps font units into normalized glyph space
    scale: f32,
}

impl Font {
    /// Read and parse the font file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FontOpenError> {
        let path = path.as_ref();
        log::debug!("Opening font {}", path.display());

        let data = fs::read(path)?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FontOpenError> {
        let offset_table = OffsetTable::new(&data)?;
        log::debug!(
            "Font contains {} tables: {:?}",
            offset_table.tables().len(),
            offset_table.tables()
        );

        let head_entry = offset_table.require_table(Tag::HEAD)?;
        let head_table = HeadTable::new(head_entry.data(&data)?)?;
        let scale = head_table
            .normalization_factor()
            .ok_or(FontOpenError::MalformedTable(Tag::HEAD))?;

        let maxp_entry = offset_table.require_table(Tag::MAXP)?;
        let maxp_table = MaxPTable::new(maxp_entry.data(&data)?)?;

        let hhea_entry = offset_table.require_table(Tag::HHEA)?;
        let hhea_table = HHEATable::new(hhea_entry.data(&data)?)?;

        let cmap_entry = offset_table.require_table(Tag::CMAP)?;
        let character_map = CharacterMap::new(cmap_entry.data(&data)?)?;

        let loca_entry = offset_table.require_table(Tag::LOCA)?;
        let loca_table = LocaTable::new(
            loca_entry.data(&data)?,
            head_table.loca_table_format(),
            maxp_table.num_glyphs as usize,
        )?;

        let glyf_entry = offset_table.require_table(Tag::GLYF)?;
        let glyf_range = glyf_entry.offset()..glyf_entry.offset() + glyf_entry.data(&data)?.len();

        let hmtx_entry = offset_table.require_table(Tag::HMTX)?;
        let hmtx_table = HMTXTable::new(
            hmtx_entry.data(&data)?,
            hhea_table.num_of_long_hor_metrics(),
            maxp_table.num_glyphs as usize,
        )?;

        Ok(Self {
            data,
            offset_table,
            head_table,
            hhea_table,
            hmtx_table,
            maxp_table,
            loca_table,
            character_map,
            glyf_range,
            scale,
        })
    }

    /// Get the total number of glyphs defined in the font
    #[must_use]
    pub fn num_glyphs(&self) -> u16 {
        self.maxp_table.num_glyphs
    }

    /// Return the number of coordinate points per font size unit.
    ///
    /// Note that this value does not constrain the size of individual glyphs.
    /// A glyph may have a size larger than `1em`.
    #[must_use]
    pub fn units_per_em(&self) -> u16 {
        self.head_table.units_per_em()
    }

    /// The factor that maps font units into normalized glyph space.
    ///
    /// After scaling, the bounding box of every glyph fits into the unit square.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// The distance between two baselines in normalized glyph space
    #[must_use]
    pub fn line_height(&self) -> f32 {
        self.hhea_table.line_height() as f32 * self.scale
    }

    #[must_use]
    pub fn ascender(&self) -> f32 {
        f32::from(self.hhea_table.ascender()) * self.scale
    }

    #[must_use]
    pub fn descender(&self) -> f32 {
        f32::from(self.hhea_table.descender()) * self.scale
    }

    /// The raw contents of the font file
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn offset_table(&self) -> &OffsetTable {
        &self.offset_table
    }

    #[must_use]
    pub fn character_map(&self) -> &CharacterMap {
        &self.character_map
    }

    /// The deepest composite glyph nesting that will be decoded
    #[must_use]
    pub fn max_component_depth(&self) -> u16 {
        self.maxp_table
            .max_component_depth
            .clamp(MIN_COMPONENT_DEPTH, MAX_COMPONENT_DEPTH)
    }

    /// Get the glyph for a codepoint.
    ///
    /// Codepoints that are not covered by the font map to [GlyphID::REPLACEMENT].
    #[must_use]
    pub fn glyph_id(&self, codepoint: u32) -> GlyphID {
        self.character_map.get_glyph_id(codepoint)
    }

    /// Call `f` for every codepoint that the font has a glyph for
    pub fn for_each_codepoint<F: FnMut(u32, GlyphID)>(&self, f: F) {
        self.character_map.for_each_codepoint(f);
    }

    /// All codepoints that the font has a glyph for, in ascending order
    #[must_use]
    pub fn codepoints(&self) -> Vec<u32> {
        let mut codepoints = vec![];
        self.for_each_codepoint(|codepoint, _| codepoints.push(codepoint));
        codepoints.sort_unstable();
        codepoints.dedup();
        codepoints
    }

    /// Decode the outline of the glyph for a codepoint.
    ///
    /// Glyphs that fail to decode are logged and replaced by an empty outline
    /// with the advance of the replacement glyph.
    #[must_use]
    pub fn get_glyph(&self, codepoint: u32) -> GlyphOutline {
        match self.try_get_glyph(codepoint) {
            Ok(outline) => outline,
            Err(error) => {
                log::warn!("Failed to decode glyph for U+{codepoint:04X}: {error}");
                GlyphOutline::empty(self.base_metrics(GlyphID::REPLACEMENT))
            },
        }
    }

    pub fn try_get_glyph(&self, codepoint: u32) -> Result<GlyphOutline, GlyphDecodeError> {
        self.decode_glyph(self.glyph_id(codepoint))
    }

    /// Decode a glyph and [reconstruct](GlyphOutline::reconstruct) its curves
    pub fn decode_glyph(&self, glyph_id: GlyphID) -> Result<GlyphOutline, GlyphDecodeError> {
        let outline = self.raw_outline(glyph_id)?.reconstruct();

        log::trace!(
            "Decoded glyph {}: {} points in {} contours",
            glyph_id.numeric(),
            outline.points().len(),
            outline.contour_ends().len()
        );
        Ok(outline)
    }

    /// Decode a glyph as it is stored in the font, without making implied points
    /// explicit or moving it to the origin.
    ///
    /// Glyphs that don't exist in the font have an empty outline.
    pub fn raw_outline(&self, glyph_id: GlyphID) -> Result<GlyphOutline, GlyphDecodeError> {
        if glyph_id.numeric() >= self.num_glyphs() {
            return Ok(GlyphOutline::default());
        }

        self.decode_outline(glyph_id, 0)
    }

    /// Advance and bearing of a glyph, without any bounding box
    fn base_metrics(&self, glyph_id: GlyphID) -> GlyphMetrics {
        let metric = self.hmtx_table.get_metric_for(glyph_id);
        GlyphMetrics {
            advance_width: f32::from(metric.advance_width()) * self.scale,
            left_side_bearing: f32::from(metric.left_side_bearing()) * self.scale,
            ..Default::default()
        }
    }

    fn decode_outline(
        &self,
        glyph_id: GlyphID,
        depth: u16,
    ) -> Result<GlyphOutline, GlyphDecodeError> {
        let mut metrics = self.base_metrics(glyph_id);

        let location = self
            .loca_table
            .get_glyph_location(glyph_id)
            .ok_or(UnexpectedEof)?;

        // Glyphs without an outline, like spaces, take up no space in the glyf table
        if location.is_empty() {
            return Ok(GlyphOutline::empty(metrics));
        }

        let glyph_data = self.data[self.glyf_range.clone()]
            .get(location)
            .ok_or(UnexpectedEof)?;
        let (header, glyph) = Glyph::new(glyph_data)?;

        metrics.x_min = f32::from(header.min_x) * self.scale;
        metrics.y_min = f32::from(header.min_y) * self.scale;
        metrics.x_max = f32::from(header.max_x) * self.scale;
        metrics.y_max = f32::from(header.max_y) * self.scale;

        match glyph {
            Glyph::Simple(simple_glyph) => {
                let (points, contour_ends) = simple_glyph.decode(self.scale)?;
                Ok(GlyphOutline::new(points, contour_ends, metrics))
            },
            Glyph::Compound(compound_glyph) => {
                self.decode_compound_glyph(glyph_id, compound_glyph, metrics, depth)
            },
        }
    }

    fn decode_compound_glyph(
        &self,
        glyph_id: GlyphID,
        compound_glyph: CompoundGlyph<'_>,
        metrics: GlyphMetrics,
        depth: u16,
    ) -> Result<GlyphOutline, GlyphDecodeError> {
        let mut outline = GlyphOutline::empty(metrics);

        for component in compound_glyph.components() {
            let component = component?;

            if component.glyph_id.numeric() >= self.num_glyphs() {
                return Err(GlyphDecodeError::ComponentOutOfRange(component.glyph_id));
            }

            let limit = self.max_component_depth();
            if depth >= limit {
                return Err(GlyphDecodeError::CompositeTooDeep { glyph_id, limit });
            }

            let mut child = self.decode_outline(component.glyph_id, depth + 1)?;

            // The points are already normalized, so only the offsets need to be scaled
            let offset = match component.placement {
                ComponentPlacement::Offset(offset) => {
                    let offset = offset.map(|value| value as f32) * self.scale;
                    if component.flags.scaled_component_offset() {
                        component.transform.apply_linear(offset)
                    } else {
                        offset
                    }
                },
                ComponentPlacement::MatchPoints {
                    parent_point,
                    child_point,
                } => {
                    let parent = outline.points().get(parent_point as usize);
                    let matched = child.points().get(child_point as usize);

                    match (parent, matched) {
                        (Some(parent), Some(matched)) => {
                            parent.position() - component.transform.apply_linear(matched.position())
                        },
                        _ => {
                            return Err(GlyphDecodeError::PointMatchOutOfRange {
                                parent_point,
                                child_point,
                            })
                        },
                    }
                },
            };

            child.transform(component.transform.chain(AffineTransform::translate(offset)));

            if component.flags.use_my_metrics() {
                let child_metrics = child.metrics();
                let metrics = outline.metrics_mut();
                metrics.advance_width = child_metrics.advance_width;
                metrics.left_side_bearing = child_metrics.left_side_bearing;
            }

            outline.append(&child);
        }

        Ok(outline)
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("num_glyphs", &self.num_glyphs())
            .field("units_per_em", &self.units_per_em())
            .field("scale", &self.scale)
            .field("size", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use math::Vec2D;

    #[test]
    fn glyph_origin_is_preserved() {
        let font = Font::from_bytes(font_test_data::test_font()).unwrap();
        let outline = font.try_get_glyph('A' as u32).unwrap();

        let metrics = outline.metrics();
        assert_eq!((metrics.x_min, metrics.y_min), (0., 0.));
        assert!(metrics.width() > 0.);
        assert!(metrics.width() <= 1.);
        assert_eq!(
            outline.origin(),
            Vec2D::new(
                f32::from(font_test_data::GLYPH_MARGIN) * font.scale(),
                0.
            )
        );
    }
}
