//! Synthetic font data shared between the tests of the font, sdf and atlas crates.
//!
//! Fonts are assembled from scratch so that every value in them is known,
//! see [TestFont] for the glyphs they contain.

pub mod bebuffer;
pub mod cmap;
pub mod font;
pub mod glyf;

use cmap::Segment;
use font::{FontBuilder, Head, Hhea};
use glyf::{CompositeGlyphBuilder, SimpleGlyphBuilder};

pub const UNITS_PER_EM: u16 = 1000;
pub const ASCENDER: i16 = 800;
pub const DESCENDER: i16 = -200;
pub const LINE_GAP: i16 = 100;

/// Distance between the left edge of most glyphs and the origin, in font units
pub const GLYPH_MARGIN: i16 = 100;

pub const ADVANCE_WIDTH: u16 = 700;
pub const SPACE_ADVANCE_WIDTH: u16 = 500;
pub const DOT_ADVANCE_WIDTH: u16 = 200;

/// Glyph ids in the test font
pub mod glyphs {
    /// A box with a rectangular hole
    pub const NOTDEF: u16 = 0;
    /// No outline
    pub const SPACE: u16 = 1;
    /// A triangle
    pub const A: u16 = 2;
    /// Straight edges and a single curve
    pub const B: u16 = 3;
    /// Only off-curve points
    pub const C: u16 = 4;
    /// A small square
    pub const DOT: u16 = 5;
    /// [A] with a scaled [DOT] on top
    pub const A_DIAERESIS: u16 = 6;
    /// A composite glyph that references itself, not mapped to any codepoint
    pub const RECURSIVE: u16 = 7;
    /// A composite glyph that references a glyph that doesn't exist, not mapped to any codepoint
    pub const BROKEN_COMPONENT: u16 = 8;
    /// [A] with a [DOT] attached to its apex by point matching, not mapped to any codepoint
    pub const ANCHORED: u16 = 9;
    /// Attaches a [DOT] to a point that [A] doesn't have, not mapped to any codepoint
    pub const MISSING_PARENT_ANCHOR: u16 = 10;
    /// Attaches a point of [DOT] that doesn't exist to [A], not mapped to any codepoint
    pub const MISSING_CHILD_ANCHOR: u16 = 11;
    /// Two contours whose end points decrease, not mapped to any codepoint
    pub const DECREASING_CONTOUR_ENDS: u16 = 12;

    pub const COUNT: u16 = 13;
}

/// A codepoint outside the basic multilingual plane, only present in format 12 character maps
pub const ASTRAL_CODEPOINT: u32 = 0x1F600;

/// Which character map subtables to include
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmapFormat {
    Format4,
    Format12,
    Both,
}

/// A font with a handful of glyphs in it.
///
/// | Codepoint | Glyph |
/// |-----------|-------|
/// | `' '`     | [SPACE](glyphs::SPACE) |
/// | `'.'`     | [DOT](glyphs::DOT) |
/// | `'A'`     | [A](glyphs::A) |
/// | `'B'`     | [B](glyphs::B) |
/// | `'C'`     | [C](glyphs::C) |
/// | `'Ä'`     | [A_DIAERESIS](glyphs::A_DIAERESIS) |
/// | [ASTRAL_CODEPOINT] | [DOT](glyphs::DOT) (format 12 only) |
#[derive(Clone, Copy, Debug)]
pub struct TestFont {
    pub cmap: CmapFormat,
    pub long_loca: bool,
    pub max_component_depth: u16,
}

impl Default for TestFont {
    fn default() -> Self {
        Self {
            cmap: CmapFormat::Both,
            long_loca: false,
            max_component_depth: 1,
        }
    }
}

impl TestFont {
    /// The glyph descriptions, indexed by glyph id
    pub fn glyphs() -> Vec<Vec<u8>> {
        let notdef = SimpleGlyphBuilder::default()
            .contour(&[
                (100, 0, true),
                (100, 700, true),
                (500, 700, true),
                (500, 0, true),
            ])
            .contour(&[
                (200, 100, true),
                (400, 100, true),
                (400, 600, true),
                (200, 600, true),
            ])
            .build();

        let a = SimpleGlyphBuilder::default()
            .contour(&[(100, 0, true), (350, 700, true), (600, 0, true)])
            .instructions(&[0xB0, 0x01])
            .build();

        let b = SimpleGlyphBuilder::default()
            .contour(&[
                (100, 0, true),
                (100, 700, true),
                (400, 700, true),
                (600, 350, false),
                (400, 0, true),
            ])
            .build();

        let c = SimpleGlyphBuilder::default()
            .contour(&[
                (350, 700, false),
                (600, 350, false),
                (350, 0, false),
                (100, 350, false),
            ])
            .build();

        let dot = SimpleGlyphBuilder::default()
            .contour(&[(0, 0, true), (0, 100, true), (100, 100, true), (100, 0, true)])
            .build();

        let a_diaeresis = CompositeGlyphBuilder::default()
            .component(glyphs::A, (0, 0))
            .use_my_metrics()
            .scaled_component(glyphs::DOT, (325, 750), 0.5)
            .bbox(100, 0, 600, 800)
            .build();

        let recursive = CompositeGlyphBuilder::default()
            .component(glyphs::RECURSIVE, (0, 0))
            .bbox(0, 0, 100, 100)
            .build();

        let broken_component = CompositeGlyphBuilder::default()
            .component(glyphs::A, (0, 0))
            .component(200, (0, 0))
            .bbox(100, 0, 600, 700)
            .build();

        // Point 1 of A is its apex
        let anchored = CompositeGlyphBuilder::default()
            .component(glyphs::A, (0, 0))
            .matched_component(glyphs::DOT, 1, 0)
            .bbox(100, 0, 600, 800)
            .build();

        let missing_parent_anchor = CompositeGlyphBuilder::default()
            .component(glyphs::A, (0, 0))
            .matched_component(glyphs::DOT, 5, 0)
            .bbox(100, 0, 600, 800)
            .build();

        let missing_child_anchor = CompositeGlyphBuilder::default()
            .component(glyphs::A, (0, 0))
            .matched_component(glyphs::DOT, 1, 9)
            .bbox(100, 0, 600, 800)
            .build();

        let decreasing_contour_ends = SimpleGlyphBuilder::default()
            .contour(&[(0, 0, true), (0, 100, true)])
            .contour(&[(100, 100, true), (100, 0, true)])
            .contour_ends(&[3, 1])
            .build();

        vec![
            notdef,
            vec![],
            a,
            b,
            c,
            dot,
            a_diaeresis,
            recursive,
            broken_component,
            anchored,
            missing_parent_anchor,
            missing_child_anchor,
            decreasing_contour_ends,
        ]
    }

    /// `(advance width, left side bearing)` for every glyph
    pub fn metrics() -> Vec<(u16, i16)> {
        (0..glyphs::COUNT)
            .map(|glyph_id| match glyph_id {
                glyphs::SPACE => (SPACE_ADVANCE_WIDTH, 0),
                glyphs::DOT | glyphs::RECURSIVE => (DOT_ADVANCE_WIDTH, 0),
                _ => (ADVANCE_WIDTH, GLYPH_MARGIN),
            })
            .collect()
    }

    pub fn cmap(&self) -> Vec<u8> {
        let format4 = || {
            cmap::format4(&[
                Segment::delta(0x20, 0x20, glyphs::SPACE),
                Segment::delta(0x2E, 0x2E, glyphs::DOT),
                Segment::delta(0x41, 0x43, glyphs::A),
                Segment::array(0xC4, &[glyphs::A_DIAERESIS]),
            ])
        };
        let format12 = || {
            cmap::format12(&[
                (0x20, 0x20, u32::from(glyphs::SPACE)),
                (0x2E, 0x2E, u32::from(glyphs::DOT)),
                (0x41, 0x43, u32::from(glyphs::A)),
                (0xC4, 0xC4, u32::from(glyphs::A_DIAERESIS)),
                (ASTRAL_CODEPOINT, ASTRAL_CODEPOINT, u32::from(glyphs::DOT)),
            ])
        };

        let subtables = match self.cmap {
            CmapFormat::Format4 => vec![(3, 1, format4())],
            CmapFormat::Format12 => vec![(3, 10, format12())],
            CmapFormat::Both => vec![(0, 3, format4()), (0, 4, format12())],
        };
        cmap::table(&subtables)
    }

    /// A builder with all tables of the font, for tests that need to tamper with them
    pub fn builder(&self) -> FontBuilder {
        let (glyf, loca) = font::glyf_and_loca(&Self::glyphs(), self.long_loca);

        let head = Head {
            units_per_em: UNITS_PER_EM,
            bbox: (0, 0, 1000, 1000),
            long_loca: self.long_loca,
        };
        let hhea = Hhea {
            ascender: ASCENDER,
            descender: DESCENDER,
            line_gap: LINE_GAP,
            num_long_metrics: glyphs::COUNT,
        };

        FontBuilder::default()
            .table(b"cmap", self.cmap())
            .table(b"glyf", glyf)
            .table(b"head", head.build())
            .table(b"hhea", hhea.build())
            .table(b"hmtx", font::hmtx(&Self::metrics()))
            .table(b"loca", loca)
            .table(b"maxp", font::maxp(glyphs::COUNT, self.max_component_depth))
    }

    pub fn build(&self) -> Vec<u8> {
        self.builder().build()
    }
}

/// The default [TestFont], with both format 4 and format 12 character maps
pub fn test_font() -> Vec<u8> {
    TestFont::default().build()
}
