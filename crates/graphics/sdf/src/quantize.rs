use math::Bitmap;

/// Map a signed distance onto a byte.
///
/// Distances are divided by `clamp` and saturated to `[-1, 1]`. Negative (inside)
/// distances map to values above `127`, so the glyph edge sits at about `128`.
#[must_use]
pub fn quantize_distance(distance: f32, clamp: f32) -> u8 {
    debug_assert!(clamp > 0.);

    let normalized = (-distance / clamp).clamp(-1., 1.);
    ((normalized + 1.) * 0.5 * 255.).round() as u8
}

/// Quantize every pixel of a distance field, see [quantize_distance]
#[must_use]
pub fn quantize(field: &Bitmap<f32>, clamp: f32) -> Bitmap<u8> {
    field.map(|distance| quantize_distance(distance, clamp))
}
