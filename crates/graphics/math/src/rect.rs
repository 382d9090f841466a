use super::Vec2D;

use std::{cmp, ops};

/// An axis-aligned rectangle, spanning `top_left` (inclusive) to `bottom_right` (exclusive)
#[derive(Clone, Copy, Debug, Default)]
pub struct Rectangle<T = f32> {
    top_left: Vec2D<T>,
    bottom_right: Vec2D<T>,
}

impl<T> Rectangle<T> {
    pub fn from_corners(top_left: Vec2D<T>, bottom_right: Vec2D<T>) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }
}

impl<T> Rectangle<T>
where
    T: Copy,
{
    pub const fn top_left(&self) -> Vec2D<T> {
        self.top_left
    }

    pub const fn bottom_right(&self) -> Vec2D<T> {
        self.bottom_right
    }
}

impl<T> Rectangle<T>
where
    T: ops::Add<Output = T> + ops::Sub<Output = T> + Copy,
{
    pub fn from_position_and_size(top_left: Vec2D<T>, width: T, height: T) -> Self {
        let bottom_right = Vec2D {
            x: top_left.x + width,
            y: top_left.y + height,
        };

        Self {
            top_left,
            bottom_right,
        }
    }

    pub fn width(&self) -> T {
        self.bottom_right.x - self.top_left.x
    }

    pub fn height(&self) -> T {
        self.bottom_right.y - self.top_left.y
    }
}

impl<T> PartialEq for Rectangle<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.top_left == other.top_left && self.bottom_right == other.bottom_right
    }
}

impl<T> Rectangle<T>
where
    T: Ord + Copy,
{
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bottom_right.x <= self.top_left.x || self.bottom_right.y <= self.top_left.y
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, other: Self) -> bool {
        self.top_left.x <= other.top_left.x
            && self.top_left.y <= other.top_left.y
            && other.bottom_right.x <= self.bottom_right.x
            && other.bottom_right.y <= self.bottom_right.y
    }

    #[inline]
    #[must_use]
    pub fn contains_point(&self, point: Vec2D<T>) -> bool {
        (self.top_left.x..self.bottom_right.x).contains(&point.x)
            && (self.top_left.y..self.bottom_right.y).contains(&point.y)
    }

    /// Return `true` if the two rectangles share at least one point.
    ///
    /// Rectangles that merely touch along an edge do not intersect.
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: Self) -> bool {
        self.top_left.x < other.bottom_right.x
            && other.top_left.x < self.bottom_right.x
            && self.top_left.y < other.bottom_right.y
            && other.top_left.y < self.bottom_right.y
    }

    #[inline]
    pub fn grow_to_contain(&mut self, other: Self) {
        self.top_left.x = cmp::min(self.top_left.x, other.top_left.x);
        self.top_left.y = cmp::min(self.top_left.y, other.top_left.y);
        self.bottom_right.x = cmp::max(self.bottom_right.x, other.bottom_right.x);
        self.bottom_right.y = cmp::max(self.bottom_right.y, other.bottom_right.y);
    }
}

#[cfg(test)]
mod tests {
    use super::{Rectangle, Vec2D};

    #[test]
    fn touching_rectangles_do_not_intersect() {
        let a = Rectangle::from_position_and_size(Vec2D::new(0, 0), 4, 4);
        let b = Rectangle::from_position_and_size(Vec2D::new(4, 0), 4, 4);
        assert!(!a.intersects(b));
        assert!(a.intersects(Rectangle::from_position_and_size(Vec2D::new(3, 3), 2, 2)));
    }

    #[test]
    fn containment() {
        let outer = Rectangle::from_position_and_size(Vec2D::new(0_u32, 0), 10, 10);
        let inner = Rectangle::from_position_and_size(Vec2D::new(2, 2), 8, 8);
        assert!(outer.contains(inner));
        assert!(!inner.contains(outer));
        assert!(outer.contains_point(Vec2D::new(9, 9)));
        assert!(!outer.contains_point(Vec2D::new(10, 9)));
    }
}
