//! Signed distance fields computed analytically from quadratic curves.

use crate::cubic::{solve_cubic, solve_linear};

use font::{GlyphOutline, QuadraticBezier};
use math::{AffineTransform, Bitmap, Vec2D};

/// Two squared distances closer than this are considered equal
const TIE_EPSILON: f64 = 1e-7;

/// Curves whose second derivative is this small relative to the first are treated as lines
const STRAIGHT_EPSILON: f64 = 1e-9;

/// A curve in pixel space, widened to double precision
#[derive(Clone, Copy, Debug)]
struct Segment {
    p0: Vec2D<f64>,
    p1: Vec2D<f64>,
    p2: Vec2D<f64>,
}

/// The point on a [Segment] that is closest to some pixel
#[derive(Clone, Copy, Debug)]
struct ClosestPoint {
    distance_squared: f64,
    point: Vec2D<f64>,
    derivative: Vec2D<f64>,
}

impl Segment {
    fn new(curve: QuadraticBezier, transform: AffineTransform) -> Self {
        Self {
            p0: transform.apply_to(curve.p0).into(),
            p1: transform.apply_to(curve.p1).into(),
            p2: transform.apply_to(curve.p2).into(),
        }
    }

    fn evaluate(&self, t: f64) -> Vec2D<f64> {
        let s = 1. - t;
        self.p0 * (s * s) + self.p1 * (2. * s * t) + self.p2 * (t * t)
    }

    fn derivative(&self, t: f64) -> Vec2D<f64> {
        ((self.p1 - self.p0) * (1. - t) + (self.p2 - self.p1) * t) * 2.
    }

    /// Minimize `|B(t) - p|²` for `t ∈ [0, 1]`.
    ///
    /// Setting the derivative of the squared distance to zero yields a cubic in `t`.
    fn closest_point_to(&self, p: Vec2D<f64>) -> ClosestPoint {
        let a = self.p1 - self.p0;
        let b = self.p0 - self.p1 * 2. + self.p2;
        let p0_to_p = self.p0 - p;

        let roots = if b.dot(b) < STRAIGHT_EPSILON * a.dot(a) {
            // Straight lines have their control point at the midpoint, the cubic term vanishes
            [
                solve_linear(2. * a.dot(a), p0_to_p.dot(a)),
                f64::INFINITY,
                f64::INFINITY,
            ]
        } else {
            solve_cubic(
                b.dot(b),
                3. * a.dot(b),
                2. * a.dot(a) + p0_to_p.dot(b),
                p0_to_p.dot(a),
            )
        };

        let candidates = roots
            .into_iter()
            .filter(|root| root.is_finite())
            .map(|root| root.clamp(0., 1.))
            .chain([0., 1.]);

        let mut closest: Option<(f64, f64)> = None;
        for t in candidates {
            let distance_squared = (self.evaluate(t) - p).magnitude_squared();
            if closest.map_or(true, |(_, best)| distance_squared < best) {
                closest = Some((t, distance_squared));
            }
        }

        // The endpoints are always candidates
        let (t, distance_squared) = closest.unwrap_or((0., (self.p0 - p).magnitude_squared()));
        ClosestPoint {
            distance_squared,
            point: self.evaluate(t),
            derivative: self.derivative(t),
        }
    }
}

impl ClosestPoint {
    /// How perpendicular the curve is to the vector from the closest point towards `p`
    fn orthogonality(&self, p: Vec2D<f64>) -> f64 {
        self.derivative
            .normalized()
            .cross_product((p - self.point).normalized())
            .abs()
    }

    /// Pixels on the right hand side of the curve direction are inside
    fn sign(&self, p: Vec2D<f64>) -> f32 {
        if self.derivative.cross_product(p - self.point) < 0. {
            -1.
        } else {
            1.
        }
    }
}

/// Compute the signed distance from the center of every pixel to the outline.
///
/// `transform` maps the outline into pixel space, where pixel `(x, y)` covers
/// `[x, x + 1) × [y, y + 1)` and row `0` is the one with the lowest `y` coordinate.
///
/// Distances are measured in pixels and are negative inside the glyph, assuming
/// TrueType contour orientation (outer contours clockwise). An outline without
/// any curves produces [f32::INFINITY] everywhere.
#[must_use]
pub fn signed_distance_field(
    outline: &GlyphOutline,
    transform: AffineTransform,
    width: usize,
    height: usize,
) -> Bitmap<f32> {
    let segments: Vec<Segment> = outline
        .quadratics()
        .map(|curve| Segment::new(curve, transform))
        .collect();

    log::trace!(
        "Computing {width}x{height} distance field from {} segments",
        segments.len()
    );

    let mut field = Bitmap::filled(width, height, f32::INFINITY);
    if segments.is_empty() {
        return field;
    }

    for y in 0..height {
        for x in 0..width {
            let p = Vec2D::new(x as f64 + 0.5, y as f64 + 0.5);
            field.set_pixel(x, y, distance_to_segments(&segments, p));
        }
    }

    field
}

fn distance_to_segments(segments: &[Segment], p: Vec2D<f64>) -> f32 {
    let mut best: Option<ClosestPoint> = None;

    for segment in segments {
        let candidate = segment.closest_point_to(p);

        let Some(current) = best else {
            best = Some(candidate);
            continue;
        };

        // Two curves meeting at a vertex are equally close to pixels near that vertex,
        // only the one facing the pixel has a meaningful sign
        let is_closer = candidate.distance_squared < current.distance_squared - TIE_EPSILON;
        let is_tie = (candidate.distance_squared - current.distance_squared).abs() <= TIE_EPSILON;
        if is_closer || (is_tie && candidate.orthogonality(p) > current.orthogonality(p)) {
            best = Some(candidate);
        }
    }

    best.map_or(f32::INFINITY, |closest| {
        closest.distance_squared.sqrt() as f32 * closest.sign(p)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use font::{GlyphMetrics, Point};

    fn point(x: f32, y: f32) -> Point {
        Point {
            x,
            y,
            on_curve: true,
        }
    }

    /// A clockwise unit square, like the outer contour of a TrueType glyph
    fn unit_square() -> GlyphOutline {
        GlyphOutline::new(
            vec![
                point(0., 0.),
                point(0., 1.),
                point(1., 1.),
                point(1., 0.),
            ],
            vec![3],
            GlyphMetrics {
                x_max: 1.,
                y_max: 1.,
                advance_width: 1.,
                ..Default::default()
            },
        )
    }

    fn square_field() -> Bitmap<f32> {
        // Map the unit square onto the pixels 5..15
        let transform =
            AffineTransform::scale(10., 10.).chain(AffineTransform::translate(Vec2D::new(5., 5.)));
        signed_distance_field(&unit_square(), transform, 20, 20)
    }

    #[test]
    fn inside_is_negative() {
        let field = square_field();

        assert!(field.get_pixel(10, 10) < 0.);
        assert!(field.get_pixel(5, 5) < 0.);
        assert!(field.get_pixel(14, 7) < 0.);

        assert!(field.get_pixel(0, 0) > 0.);
        assert!(field.get_pixel(4, 10) > 0.);
        assert!(field.get_pixel(19, 19) > 0.);
        assert!(field.get_pixel(10, 15) > 0.);
    }

    #[test]
    fn distances_are_euclidean() {
        let field = square_field();

        // Pixel center (10.5, 10.5) is 4.5 pixels from the nearest edge
        assert!((field.get_pixel(10, 10) + 4.5).abs() < 1e-4);

        // Pixel center (2.5, 10.5) is 2.5 pixels left of the square
        assert!((field.get_pixel(2, 10) - 2.5).abs() < 1e-4);

        // Pixel center (1.5, 1.5) is closest to the corner at (5, 5)
        let expected = (2. * 3.5_f32 * 3.5).sqrt();
        assert!((field.get_pixel(1, 1) - expected).abs() < 1e-4);
    }

    #[test]
    fn magnitude_grows_away_from_the_edge() {
        let field = square_field();
        let row = field.row(10);

        for pair in row[10..20].windows(2) {
            assert!(pair[0] < pair[1], "{row:?}");
        }
    }

    #[test]
    fn curved_segments() {
        // A diamond whose right half bulges outwards
        let outline = GlyphOutline::new(
            vec![
                point(0., 0.5),
                point(0.5, 1.),
                Point {
                    x: 1.,
                    y: 0.5,
                    on_curve: false,
                },
                point(0.5, 0.),
            ],
            vec![3],
            GlyphMetrics::default(),
        );
        let field = signed_distance_field(&outline, AffineTransform::scale(16., 16.), 16, 16);

        assert!(field.get_pixel(8, 8) < 0.);
        assert!(field.get_pixel(0, 0) > 0.);
        assert!(field.get_pixel(15, 15) > 0.);
        assert!(field.get_pixel(10, 8) < 0.);
    }

    #[test]
    fn empty_outline() {
        let field = signed_distance_field(
            &GlyphOutline::empty(GlyphMetrics::default()),
            AffineTransform::identity(),
            4,
            3,
        );
        assert!(field.data().iter().all(|&d| d == f32::INFINITY));
    }
}
