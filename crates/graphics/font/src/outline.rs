//! Decoded glyph outlines and their reconstruction into quadratic curves.

use crate::path::QuadraticBezier;
use math::{AffineTransform, Vec2D};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub on_curve: bool,
}

impl Point {
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec2D {
        Vec2D::new(self.x, self.y)
    }

    #[inline]
    #[must_use]
    fn midpoint(a: Self, b: Self) -> Self {
        let position = Vec2D::midpoint(a.position(), b.position());
        Self {
            x: position.x,
            y: position.y,
            on_curve: true,
        }
    }
}

/// Glyph metrics in normalized glyph space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphMetrics {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub advance_width: f32,
    pub left_side_bearing: f32,
}

impl GlyphMetrics {
    #[inline]
    #[must_use]
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }
}

/// The points and contours that make up a single glyph.
///
/// Outlines own their data and stay valid after the font they came from is dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphOutline {
    points: Vec<Point>,

    /// Index of the last point of every contour, strictly increasing
    contour_ends: Vec<u32>,
    metrics: GlyphMetrics,

    /// Where the bounding box minimum was before [reconstruct](Self::reconstruct) moved it to zero
    origin: Vec2D,
}

impl GlyphOutline {
    /// An outline without any contours
    #[must_use]
    pub fn empty(metrics: GlyphMetrics) -> Self {
        Self {
            metrics,
            ..Default::default()
        }
    }

    /// Build an outline from raw parts.
    ///
    /// `contour_ends` must be strictly increasing and the last entry must be
    /// the index of the last point.
    #[must_use]
    pub fn new(points: Vec<Point>, contour_ends: Vec<u32>, metrics: GlyphMetrics) -> Self {
        debug_assert!(contour_ends.windows(2).all(|pair| pair[0] < pair[1]));
        debug_assert_eq!(
            contour_ends.last().map_or(0, |&last| last as usize + 1),
            points.len()
        );

        Self {
            points,
            contour_ends,
            metrics,
            origin: Vec2D::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    #[must_use]
    pub fn contour_ends(&self) -> &[u32] {
        &self.contour_ends
    }

    #[inline]
    #[must_use]
    pub fn metrics(&self) -> GlyphMetrics {
        self.metrics
    }

    #[inline]
    pub fn metrics_mut(&mut self) -> &mut GlyphMetrics {
        &mut self.metrics
    }

    #[inline]
    #[must_use]
    pub fn origin(&self) -> Vec2D {
        self.origin
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the contours of the outline
    pub fn contours(&self) -> impl Iterator<Item = &[Point]> + '_ {
        let mut start = 0;
        self.contour_ends.iter().map(move |&end| {
            let contour = &self.points[start..=end as usize];
            start = end as usize + 1;
            contour
        })
    }

    /// Apply a transform to every point
    pub fn transform(&mut self, transform: AffineTransform) {
        for point in &mut self.points {
            let position = transform.apply_to(point.position());
            point.x = position.x;
            point.y = position.y;
        }
    }

    /// Add the contours of `other` to this outline
    pub fn append(&mut self, other: &Self) {
        let offset = self.points.len() as u32;
        self.points.extend_from_slice(&other.points);
        self.contour_ends
            .extend(other.contour_ends.iter().map(|end| end + offset));
    }

    /// Make all implicit on-curve points explicit and move the outline so
    /// that its bounding box starts at the origin.
    ///
    /// Afterwards, every contour starts with an on-curve point and no two
    /// consecutive points are off-curve.
    #[must_use]
    pub fn reconstruct(&self) -> Self {
        // Count the points first so the final buffer never reallocates
        let total_points: usize = self
            .contours()
            .map(|contour| contour.len() + implied_points(contour))
            .sum();

        let offset = Vec2D::new(-self.metrics.x_min, -self.metrics.y_min);
        let mut points = Vec::with_capacity(total_points);
        let mut contour_ends = Vec::with_capacity(self.contour_ends.len());

        for contour in self.contours() {
            let n = contour.len();

            // Start on the last point if it is the only on-curve point we can reach without
            // inserting one, otherwise start at the first point.
            let start = if contour[0].on_curve || !contour[n - 1].on_curve {
                0
            } else {
                n - 1
            };

            for k in 0..n {
                let i = (start + k) % n;
                let previous = contour[(i + n - 1) % n];
                let current = contour[i];

                if !previous.on_curve && !current.on_curve {
                    points.push(Point::midpoint(previous, current));
                }
                points.push(current);
            }

            contour_ends.push(points.len() as u32 - 1);
        }
        debug_assert_eq!(points.len(), total_points);

        for point in &mut points {
            point.x += offset.x;
            point.y += offset.y;
        }

        let metrics = GlyphMetrics {
            x_min: 0.,
            x_max: self.metrics.width(),
            y_min: 0.,
            y_max: self.metrics.height(),
            ..self.metrics
        };

        Self {
            points,
            contour_ends,
            metrics,
            origin: Vec2D::new(self.metrics.x_min, self.metrics.y_min),
        }
    }

    /// The quadratic segments of a [reconstructed](Self::reconstruct) outline.
    ///
    /// Straight lines are returned as curves whose control point is the midpoint.
    /// Segments of zero length are skipped.
    pub fn quadratics(&self) -> impl Iterator<Item = QuadraticBezier> + '_ {
        self.contours()
            .flat_map(contour_segments)
            .filter(|segment| !segment.is_degenerate())
    }
}

/// The number of on-curve points that are implied between consecutive off-curve points
fn implied_points(contour: &[Point]) -> usize {
    let n = contour.len();
    (0..n)
        .filter(|&i| !contour[(i + n - 1) % n].on_curve && !contour[i].on_curve)
        .count()
}

fn contour_segments(contour: &[Point]) -> impl Iterator<Item = QuadraticBezier> + '_ {
    let n = contour.len();
    let mut i = 0;
    let mut current = contour.first().map(Point::position).unwrap_or_default();

    std::iter::from_fn(move || {
        if i >= n {
            return None;
        }

        let next = contour[(i + 1) % n];
        let segment = if next.on_curve || n < 3 {
            i += 1;
            QuadraticBezier::line(current, next.position())
        } else {
            let end = contour[(i + 2) % n];
            i += 2;
            QuadraticBezier::new(current, next.position(), end.position())
        };

        current = segment.p2;
        Some(segment)
    })
}
