use std::ops::{Add, Div, Mul, Neg, Sub};

/// Generate a trait impl for an operation involving two [Vec2D]s, like [Add] or [Sub]
macro_rules! impl_bin_op {
    ($trait: ident, $fn: ident, $op: tt) => {
        impl<T: $trait<T, Output = T>> $trait for Vec2D<T> {
            type Output = Vec2D<T>;

            #[must_use]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self {
                    x: self.x $op rhs.x,
                    y: self.y $op rhs.y,
                }
            }
        }
    };
}

/// Generate a trait impl for an operation involving a [Vec2D] and a scalar value of unknown type
macro_rules! impl_scalar_op {
    ($trait: ident, $fn: ident, $op: tt, $rhs: ident) => {
        impl<T: $trait<$rhs, Output = T>> $trait<$rhs> for Vec2D<T> {
            type Output = Vec2D<T>;

            #[must_use]
            fn $fn(self, rhs: $rhs) -> Self::Output {
                Self {
                    x: self.x $op rhs,
                    y: self.y $op rhs,
                }
            }
        }
    };
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2D<T = f32> {
    pub x: T,
    pub y: T,
}

impl<T> Vec2D<T> {
    #[inline]
    #[must_use]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    #[inline]
    #[must_use]
    pub fn map<U, F: Fn(T) -> U>(self, f: F) -> Vec2D<U> {
        Vec2D {
            x: f(self.x),
            y: f(self.y),
        }
    }
}

impl Vec2D<f32> {
    #[inline]
    #[must_use]
    pub fn midpoint(a: Self, b: Self) -> Self {
        Self::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
    }

    #[inline]
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.x.hypot(self.y)
    }

    #[inline]
    #[must_use]
    pub fn lerp(&self, other: Self, t: f32) -> Self {
        debug_assert!(0. <= t);
        debug_assert!(t <= 1.);

        Self {
            x: (other.x - self.x).mul_add(t, self.x),
            y: (other.y - self.y).mul_add(t, self.y),
        }
    }

    // Compute the dot product of two vectors
    #[inline]
    #[must_use]
    pub fn dot(&self, other: Self) -> f32 {
        self.x.mul_add(other.x, self.y * other.y)
    }

    // Compute the cross product of two vectors
    #[inline]
    #[must_use]
    pub fn cross_product(&self, other: Self) -> f32 {
        self.x.mul_add(other.y, -self.y * other.x)
    }
}

impl Vec2D<f64> {
    #[inline]
    #[must_use]
    pub fn magnitude_squared(&self) -> f64 {
        self.x.mul_add(self.x, self.y * self.y)
    }

    #[inline]
    #[must_use]
    pub fn dot(&self, other: Self) -> f64 {
        self.x.mul_add(other.x, self.y * other.y)
    }

    #[inline]
    #[must_use]
    pub fn cross_product(&self, other: Self) -> f64 {
        self.x.mul_add(other.y, -self.y * other.x)
    }

    /// Scale the vector to unit length.
    ///
    /// Vectors of length zero are returned unchanged.
    #[inline]
    #[must_use]
    pub fn normalized(&self) -> Self {
        let magnitude = self.magnitude_squared().sqrt();
        if magnitude == 0. {
            *self
        } else {
            Self::new(self.x / magnitude, self.y / magnitude)
        }
    }
}

impl From<Vec2D<f32>> for Vec2D<f64> {
    fn from(value: Vec2D<f32>) -> Self {
        Self::new(f64::from(value.x), f64::from(value.y))
    }
}

impl<T: Neg<Output = T>> Neg for Vec2D<T> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

impl_bin_op!(Add, add, +);
impl_bin_op!(Sub, sub, -);

impl_scalar_op!(Mul, mul, *, f32);
impl_scalar_op!(Mul, mul, *, f64);
impl_scalar_op!(Mul, mul, *, i16);
impl_scalar_op!(Mul, mul, *, i32);
impl_scalar_op!(Mul, mul, *, u32);
impl_scalar_op!(Mul, mul, *, usize);

impl_scalar_op!(Div, div, /, f32);
impl_scalar_op!(Div, div, /, f64);
impl_scalar_op!(Div, div, /, i16);
impl_scalar_op!(Div, div, /, i32);
impl_scalar_op!(Div, div, /, u32);
impl_scalar_op!(Div, div, /, usize);

#[cfg(test)]
mod tests {
    use super::Vec2D;

    #[test]
    fn magnitude() {
        let vec = Vec2D::new(1., 1.);
        assert_eq!(vec.magnitude(), std::f32::consts::SQRT_2);
    }

    #[test]
    fn vec2d_add() {
        assert_eq!(Vec2D::new(1., 0.) + Vec2D::new(1., 1.), Vec2D::new(2., 1.));
        assert_eq!(Vec2D::new(-2, 1) + Vec2D::new(1, 0), Vec2D::new(-1, 1));
    }

    #[test]
    fn vec2d_sub() {
        assert_eq!(Vec2D::new(1., 0.) - Vec2D::new(1., 1.), Vec2D::new(0., -1.));
        assert_eq!(Vec2D::new(-2, 1) - Vec2D::new(1, 0), Vec2D::new(-3, 1));
    }

    #[test]
    fn vec2d_mul() {
        assert_eq!(Vec2D::new(1., -1.) * 2., Vec2D::new(2., -2.));
        assert_eq!(Vec2D::new(1, -1) * 2, Vec2D::new(2, -2));
    }

    #[test]
    fn vec2d_div() {
        assert_eq!(Vec2D::new(1., -1.) / 2., Vec2D::new(0.5, -0.5));
        assert_eq!(Vec2D::new(2, -1) / 2, Vec2D::new(1, 0));
    }

    #[test]
    fn midpoint_of_floats() {
        let mid = Vec2D::midpoint(Vec2D::new(0., 1.), Vec2D::new(1., 3.));
        assert_eq!(mid, Vec2D::new(0.5, 2.));
    }

    #[test]
    fn cross_product_sign() {
        // Counterclockwise turn is positive in a y-up coordinate system
        let a: Vec2D<f32> = Vec2D::new(1., 0.);
        let b: Vec2D<f32> = Vec2D::new(0., 1.);
        assert!(a.cross_product(b) > 0.);
        assert!(b.cross_product(a) < 0.);
    }

    #[test]
    fn normalize_vector() {
        let v: Vec2D<f64> = Vec2D::new(3., 4.);
        let n = v.normalized();
        assert!((n.magnitude_squared() - 1.).abs() < 1e-12);
        assert_eq!(Vec2D::<f64>::new(0., 0.).normalized(), Vec2D::new(0., 0.));
    }
}
