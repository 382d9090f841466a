use math::Vec2D;

/// A quadratic bezier curve from `p0` to `p2`, pulled towards the control point `p1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadraticBezier {
    pub p0: Vec2D,
    pub p1: Vec2D,
    pub p2: Vec2D,
}

impl QuadraticBezier {
    #[inline]
    #[must_use]
    pub const fn new(p0: Vec2D, p1: Vec2D, p2: Vec2D) -> Self {
        Self { p0, p1, p2 }
    }

    /// A straight line, expressed as a curve with the control point halfway between the ends
    #[inline]
    #[must_use]
    pub fn line(from: Vec2D, to: Vec2D) -> Self {
        Self::new(from, Vec2D::midpoint(from, to), to)
    }

    #[must_use]
    pub fn evaluate(&self, t: f32) -> Vec2D {
        let a = self.p0.lerp(self.p1, t);
        let b = self.p1.lerp(self.p2, t);
        a.lerp(b, t)
    }

    /// The first derivative of the curve at `t`
    #[must_use]
    pub fn derivative(&self, t: f32) -> Vec2D {
        ((self.p1 - self.p0) * (1. - t) + (self.p2 - self.p1) * t) * 2.
    }

    /// Whether all three points lie on one line
    #[must_use]
    pub fn is_line(&self) -> bool {
        (self.p1 - self.p0).cross_product(self.p2 - self.p0).abs() < f32::EPSILON
    }

    /// Whether the curve collapses into a single point
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.p0 == self.p1 && self.p1 == self.p2
    }

    /// Approximate the curve with `n` line segments
    pub fn flatten(&self, n: usize) -> impl Iterator<Item = (Vec2D, Vec2D)> + '_ {
        let n = n.max(1);
        (0..n).map(move |i| {
            let t0 = i as f32 / n as f32;
            let t1 = (i + 1) as f32 / n as f32;
            (self.evaluate(t0), self.evaluate(t1))
        })
    }
}
