use atlas::{AtlasSettings, GlyphAtlas};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use font::Font;

fn criterion_benchmark(c: &mut Criterion) {
    let font = Font::from_bytes(font_test_data::test_font()).expect("test font is valid");

    for glyph_size in [16, 32, 64] {
        let settings = AtlasSettings {
            glyph_size,
            ..Default::default()
        };

        c.bench_with_input(
            BenchmarkId::new("build atlas", glyph_size),
            &settings,
            |b, settings| b.iter(|| GlyphAtlas::from_settings(&font, settings, &[32..=126])),
        );
    }

    let atlas = GlyphAtlas::from_settings(&font, &AtlasSettings::default(), &[32..=126])
        .expect("atlas can be built");
    let bytes = atlas.to_bytes();
    c.bench_with_input(
        BenchmarkId::new("load atlas", "ascii"),
        &bytes,
        |b, bytes| b.iter(|| GlyphAtlas::from_bytes(bytes)),
    );
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
