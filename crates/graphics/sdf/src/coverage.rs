//! Anti-aliased coverage rasterization by signed area accumulation.

use font::{GlyphOutline, QuadraticBezier};
use math::{AffineTransform, Bitmap, Vec2D};

/// Curves that deviate less than this from a straight line are drawn as one
const FLATNESS_THRESHOLD: f32 = 0.333;

/// Controls how finely curves are subdivided, larger is finer
const SUBDIVISION_TOLERANCE: f32 = 3.0;

/// Accumulates the area covered by a closed outline.
///
/// Row `0` of the output is the one with the lowest `y` coordinate, matching
/// [signed_distance_field](crate::signed_distance_field).
#[derive(Clone, Debug)]
pub struct Rasterizer {
    width: usize,
    height: usize,

    /// Signed area deltas, two cells longer than the image so
    /// lines touching the right edge never index out of bounds
    buffer: Vec<f32>,
}

impl Rasterizer {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: vec![0.0; width * height + 2],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
    }

    /// Rasterize a 2D Line.
    /// **Greatly** inspired by <https://github.com/raphlinus/font-rs/blob/master/src/raster.rs#L44>
    pub fn draw_line(&mut self, from: Vec2D, to: Vec2D) {
        // Horizontal lines don't change the winding, they are covered by the fill
        if (from.y - to.y).abs() <= f32::EPSILON {
            return;
        }

        // Always go from the lower point to the higher one
        let (direction, from, to) = if from.y < to.y {
            (1.0, from, to)
        } else {
            (-1.0, to, from)
        };

        let dxdy = (to.x - from.x) / (to.y - from.y);
        let mut x = from.x;
        let y_start = from.y as usize;
        if from.y.is_sign_negative() {
            x -= from.y * dxdy;
        }

        let right_edge = self.width as f32;
        for y in y_start..self.height.min(to.y.ceil() as usize) {
            let linestart = y * self.width;

            // The y-delta covered by this line segment.
            // Will usually be one, except for the first and last row
            let dy = ((y + 1) as f32).min(to.y) - (y as f32).max(from.y);
            let xnext = x + dxdy * dy;
            let d = dy * direction;

            // Area to the left of the image is accumulated into the first column
            let (x0, x1) = if x < xnext { (x, xnext) } else { (xnext, x) };
            let x0 = x0.clamp(0., right_edge);
            let x1 = x1.clamp(0., right_edge);

            let x0floor = x0.floor();
            let x0i = x0floor as usize;
            let x1ceil = x1.ceil();
            let x1i = x1ceil as usize;

            if x1i <= x0i + 1 {
                let xmf = 0.5 * (x0 + x1) - x0floor;
                self.buffer[linestart + x0i] += d - d * xmf;
                self.buffer[linestart + x0i + 1] += d * xmf;
            } else {
                let s = (x1 - x0).recip();
                let x0f = x0 - x0floor;
                let a0 = 0.5 * s * (1.0 - x0f) * (1.0 - x0f);
                let x1f = x1 - x1ceil + 1.0;
                let am = 0.5 * s * x1f * x1f;

                self.buffer[linestart + x0i] += d * a0;
                if x1i == x0i + 2 {
                    self.buffer[linestart + x0i + 1] += d * (1.0 - a0 - am);
                } else {
                    let a1 = s * (1.5 - x0f);
                    self.buffer[linestart + x0i + 1] += d * (a1 - a0);
                    for xi in x0i + 2..x1i - 1 {
                        self.buffer[linestart + xi] += d * s;
                    }
                    let a2 = a1 + (x1i - x0i - 3) as f32 * s;
                    self.buffer[linestart + x1i - 1] += d * (1.0 - a2 - am);
                }
                self.buffer[linestart + x1i] += d * am;
            }
            x = xnext;
        }
    }

    /// Rasterize a quadratic Bézier curve
    /// **Greatly** inspired by <https://github.com/raphlinus/font-rs/blob/master/src/raster.rs#L106>
    pub fn draw_quad_bezier(&mut self, curve: QuadraticBezier) {
        let deviation = curve.p0 - curve.p1 * 2. + curve.p2;
        let devsq = deviation.dot(deviation);
        if devsq < FLATNESS_THRESHOLD {
            // The control point is so close to the direct line
            // that drawing a straight line suffices
            self.draw_line(curve.p0, curve.p2);
            return;
        }

        // Approximate the number of segments that we should interpolate the curve into
        let n = 1 + (SUBDIVISION_TOLERANCE * devsq).sqrt().sqrt().floor() as usize;
        for (from, to) in curve.flatten(n) {
            self.draw_line(from, to);
        }
    }

    /// Draw every contour of the outline after mapping it into pixel space
    pub fn draw_outline(&mut self, outline: &GlyphOutline, transform: AffineTransform) {
        for curve in outline.quadratics() {
            let curve = QuadraticBezier::new(
                transform.apply_to(curve.p0),
                transform.apply_to(curve.p1),
                transform.apply_to(curve.p2),
            );

            if curve.is_line() {
                self.draw_line(curve.p0, curve.p2);
            } else {
                self.draw_quad_bezier(curve);
            }
        }
    }

    pub fn for_each_pixel<F: FnMut((usize, usize), u8)>(&self, mut callback: F) {
        let mut accumulator: f32 = 0.;
        for y in 0..self.height {
            for x in 0..self.width {
                let i = y * self.width + x;
                accumulator += self.buffer[i];
                callback((x, y), (accumulator.abs().min(1.0) * 255.0) as u8);
            }
        }
    }

    /// Write the accumulated coverage into a caller-provided bitmap of the same size
    pub fn write_coverage(&self, target: &mut Bitmap<u8>) {
        debug_assert_eq!(target.width(), self.width);
        debug_assert_eq!(target.height(), self.height);

        self.for_each_pixel(|(x, y), coverage| target.set_pixel(x, y, coverage));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use font::{GlyphMetrics, Point};

    fn square(from: f32, to: f32) -> GlyphOutline {
        let points = [(from, from), (from, to), (to, to), (to, from)]
            .into_iter()
            .map(|(x, y)| Point {
                x,
                y,
                on_curve: true,
            })
            .collect();
        GlyphOutline::new(points, vec![3], GlyphMetrics::default())
    }

    #[test]
    fn fill_square() {
        let mut rasterizer = Rasterizer::new(8, 8);
        rasterizer.draw_outline(&square(2., 6.), AffineTransform::identity());

        let mut coverage = Bitmap::new(8, 8);
        rasterizer.write_coverage(&mut coverage);

        for y in 0..8 {
            for x in 0..8 {
                let inside = (2..6).contains(&x) && (2..6).contains(&y);
                let expected = if inside { 255 } else { 0 };
                assert_eq!(coverage.get_pixel(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn partial_coverage() {
        let mut rasterizer = Rasterizer::new(4, 4);
        rasterizer.draw_outline(&square(0.5, 3.5), AffineTransform::identity());

        let mut coverage = Bitmap::new(4, 4);
        rasterizer.write_coverage(&mut coverage);

        assert_eq!(coverage.get_pixel(1, 1), 255);
        assert_eq!(coverage.get_pixel(0, 1), 127);
        assert_eq!(coverage.get_pixel(0, 0), 63);
    }

    #[test]
    fn shapes_leaving_the_canvas() {
        let mut rasterizer = Rasterizer::new(4, 4);
        rasterizer.draw_outline(&square(-2., 8.), AffineTransform::identity());

        let mut coverage = Bitmap::new(4, 4);
        rasterizer.write_coverage(&mut coverage);
        assert!(coverage.data().iter().all(|&c| c == 255));

        rasterizer.clear();
        rasterizer.write_coverage(&mut coverage);
        assert!(coverage.data().iter().all(|&c| c == 0));
    }

    #[test]
    fn curved_outline() {
        // All off-curve points form a circle-like ring
        let points = [(0., 4.), (4., 8.), (8., 4.), (4., 0.)]
            .into_iter()
            .map(|(x, y)| Point {
                x,
                y,
                on_curve: false,
            })
            .collect();
        let outline = GlyphOutline::new(points, vec![3], GlyphMetrics::default()).reconstruct();

        let mut rasterizer = Rasterizer::new(8, 8);
        rasterizer.draw_outline(&outline, AffineTransform::identity());

        let mut coverage = Bitmap::new(8, 8);
        rasterizer.write_coverage(&mut coverage);
        assert_eq!(coverage.get_pixel(4, 4), 255);
        assert_eq!(coverage.get_pixel(0, 0), 0);
        assert_eq!(coverage.get_pixel(7, 7), 0);
    }
}
