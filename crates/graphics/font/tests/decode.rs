use font::{Font, FontOpenError, GlyphDecodeError, GlyphID, Tag};
use font_test_data::{cmap, font::FontBuilder, glyphs, CmapFormat, TestFont, ASTRAL_CODEPOINT};

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-5,
        "expected {expected}, found {actual}"
    );
}

fn test_font() -> Font {
    Font::from_bytes(font_test_data::test_font()).expect("test font should parse")
}

#[test]
fn font_properties() {
    let font = test_font();
    assert_eq!(font.num_glyphs(), glyphs::COUNT);
    assert_eq!(font.units_per_em(), 1000);
    assert_close(font.scale(), 0.001);
    assert_close(font.line_height(), 1.1);
    assert_close(font.ascender(), 0.8);
    assert_close(font.descender(), -0.2);
    assert_eq!(font.max_component_depth(), 8);
}

#[test]
fn open_from_disk() {
    let path = std::env::temp_dir().join(format!("font-open-test-{}.ttf", std::process::id()));
    std::fs::write(&path, font_test_data::test_font()).unwrap();

    let font = Font::open(&path);
    std::fs::remove_file(&path).unwrap();
    assert_eq!(font.unwrap().num_glyphs(), glyphs::COUNT);

    assert!(matches!(
        Font::open("this/font/does/not/exist.ttf"),
        Err(FontOpenError::Io(_))
    ));
}

#[test]
fn reject_invalid_fonts() {
    let bad_signature = TestFont::default().builder().signature(*b"wOF2").build();
    assert!(matches!(
        Font::from_bytes(bad_signature),
        Err(FontOpenError::InvalidSignature(0x774F_4632))
    ));

    let missing_glyf = TestFont::default().builder().without_table(b"glyf").build();
    assert!(matches!(
        Font::from_bytes(missing_glyf),
        Err(FontOpenError::MissingTable(Tag::GLYF))
    ));

    let mac_only = TestFont::default()
        .builder()
        .table(
            b"cmap",
            cmap::table(&[(1, 0, cmap::format4(&[cmap::Segment::delta(0x41, 0x41, 2)]))]),
        )
        .build();
    assert!(matches!(
        Font::from_bytes(mac_only),
        Err(FontOpenError::NoUsableCmap)
    ));

    let mut truncated = font_test_data::test_font();
    truncated.truncate(40);
    assert!(Font::from_bytes(truncated).is_err());

    assert!(matches!(
        Font::from_bytes(vec![]),
        Err(FontOpenError::UnexpectedEof(_))
    ));
}

#[test]
fn map_codepoints_to_glyphs() {
    let font = test_font();
    assert_eq!(font.glyph_id(' ' as u32), GlyphID::new(glyphs::SPACE));
    assert_eq!(font.glyph_id('B' as u32), GlyphID::new(glyphs::B));
    assert_eq!(font.glyph_id('Ä' as u32), GlyphID::new(glyphs::A_DIAERESIS));
    assert_eq!(font.glyph_id(ASTRAL_CODEPOINT), GlyphID::new(glyphs::DOT));
    assert_eq!(font.glyph_id('Z' as u32), GlyphID::REPLACEMENT);

    let bmp_only = Font::from_bytes(
        TestFont {
            cmap: CmapFormat::Format4,
            ..Default::default()
        }
        .build(),
    )
    .unwrap();
    assert_eq!(bmp_only.glyph_id('Ä' as u32), GlyphID::new(glyphs::A_DIAERESIS));
    assert_eq!(bmp_only.glyph_id(ASTRAL_CODEPOINT), GlyphID::REPLACEMENT);
}

#[test]
fn enumerate_codepoints() {
    let font = test_font();
    assert_eq!(
        font.codepoints(),
        [0x20, 0x2E, 0x41, 0x42, 0x43, 0xC4, ASTRAL_CODEPOINT]
    );

    let bmp_only = Font::from_bytes(
        TestFont {
            cmap: CmapFormat::Format4,
            ..Default::default()
        }
        .build(),
    )
    .unwrap();
    assert_eq!(bmp_only.codepoints(), [0x20, 0x2E, 0x41, 0x42, 0x43, 0xC4]);
}

#[test]
fn decode_simple_glyph() {
    let font = test_font();
    let outline = font.get_glyph('A' as u32);

    assert_eq!(outline.points().len(), 3);
    assert_eq!(outline.contour_ends(), [2]);
    assert!(outline.points().iter().all(|point| point.on_curve));

    let metrics = outline.metrics();
    assert_close(metrics.width(), 0.5);
    assert_close(metrics.height(), 0.7);
    assert_close(metrics.advance_width, 0.7);
    assert_close(metrics.left_side_bearing, 0.1);

    // Apex of the triangle, relative to the bounding box
    assert_close(outline.points()[1].x, 0.25);
    assert_close(outline.points()[1].y, 0.7);
}

#[test]
fn decode_glyph_with_hole() {
    let font = test_font();
    let outline = font.decode_glyph(GlyphID::REPLACEMENT).unwrap();
    assert_eq!(outline.contour_ends(), [3, 7]);
    assert_eq!(outline.contours().count(), 2);
}

#[test]
fn off_curve_points_are_made_explicit() {
    let font = test_font();
    let outline = font.get_glyph('C' as u32);

    assert_eq!(outline.points().len(), 8);
    assert!(outline.points()[0].on_curve);
    for (i, point) in outline.points().iter().enumerate() {
        assert_eq!(point.on_curve, i % 2 == 0);
    }
    assert_eq!(outline.quadratics().count(), 4);
}

#[test]
fn empty_glyph() {
    let font = test_font();
    let outline = font.get_glyph(' ' as u32);

    assert!(outline.is_empty());
    assert_eq!(outline.contours().count(), 0);
    assert_close(outline.metrics().advance_width, 0.5);
}

#[test]
fn out_of_range_glyph_is_empty() {
    let font = test_font();
    let outline = font.decode_glyph(GlyphID::new(500)).unwrap();
    assert!(outline.is_empty());
}

#[test]
fn composite_glyph() {
    let font = test_font();
    let raw = font
        .raw_outline(GlyphID::new(glyphs::A_DIAERESIS))
        .unwrap();

    assert_eq!(raw.points().len(), 7);
    assert_eq!(raw.contour_ends(), [2, 6]);

    // The dot is scaled by one half and moved above the A
    let dot = &raw.points()[3..];
    assert_close(dot[0].x, 0.325);
    assert_close(dot[0].y, 0.75);
    assert_close(dot[2].x, 0.375);
    assert_close(dot[2].y, 0.8);

    // Metrics are taken from the A component
    assert_close(raw.metrics().advance_width, 0.7);
    assert_close(raw.metrics().y_max, 0.8);

    let outline = font.get_glyph('Ä' as u32);
    assert_eq!(outline.points().len(), 7);
    assert_close(outline.origin().x, 0.1);
}

#[test]
fn point_matched_component() {
    let font = test_font();
    let raw = font.raw_outline(GlyphID::new(glyphs::ANCHORED)).unwrap();

    // The dot starts at the apex of the A
    assert_eq!(raw.points().len(), 7);
    assert_close(raw.points()[3].x, 0.35);
    assert_close(raw.points()[3].y, 0.7);
    assert_close(raw.points()[5].x, 0.45);
    assert_close(raw.points()[5].y, 0.8);
}

#[test]
fn composite_recursion_is_limited() {
    let font = test_font();
    let result = font.decode_glyph(GlyphID::new(glyphs::RECURSIVE));

    assert_eq!(
        result,
        Err(GlyphDecodeError::CompositeTooDeep {
            glyph_id: GlyphID::new(glyphs::RECURSIVE),
            limit: 8
        })
    );
}

#[test]
fn missing_component() {
    let font = test_font();
    let result = font.decode_glyph(GlyphID::new(glyphs::BROKEN_COMPONENT));
    assert_eq!(
        result,
        Err(GlyphDecodeError::ComponentOutOfRange(GlyphID::new(200)))
    );
}

#[test]
fn anchor_points_must_exist() {
    let font = test_font();

    // A only has three points
    assert_eq!(
        font.decode_glyph(GlyphID::new(glyphs::MISSING_PARENT_ANCHOR)),
        Err(GlyphDecodeError::PointMatchOutOfRange {
            parent_point: 5,
            child_point: 0
        })
    );

    // The dot only has four points
    assert_eq!(
        font.decode_glyph(GlyphID::new(glyphs::MISSING_CHILD_ANCHOR)),
        Err(GlyphDecodeError::PointMatchOutOfRange {
            parent_point: 1,
            child_point: 9
        })
    );
}

#[test]
fn contour_ends_must_increase() {
    let font = test_font();
    assert_eq!(
        font.decode_glyph(GlyphID::new(glyphs::DECREASING_CONTOUR_ENDS)),
        Err(GlyphDecodeError::InvalidContourEnds)
    );
}

#[test]
fn long_loca_offsets() {
    let short = test_font();
    let long = Font::from_bytes(
        TestFont {
            long_loca: true,
            ..Default::default()
        }
        .build(),
    )
    .unwrap();

    for codepoint in short.codepoints() {
        assert_eq!(short.get_glyph(codepoint), long.get_glyph(codepoint));
    }
}

#[test]
fn broken_glyphs_fall_back_to_empty_outline() {
    let data = TestFont::default()
        .builder()
        .table(b"glyf", vec![0; 10])
        .build();
    let font = Font::from_bytes(data).unwrap();

    assert!(matches!(
        font.try_get_glyph('A' as u32),
        Err(GlyphDecodeError::UnexpectedEof(_))
    ));

    let outline = font.get_glyph('A' as u32);
    assert!(outline.is_empty());
    assert_close(outline.metrics().advance_width, 0.7);
}

#[test]
fn font_builder_sorts_tables() {
    // Tables are written in tag order, regardless of insertion order
    let data = FontBuilder::default()
        .table(b"maxp", vec![0; 4])
        .table(b"cmap", vec![0; 4])
        .build();
    assert_eq!(&data[12..16], b"cmap");
    assert_eq!(&data[28..32], b"maxp");
}
