//! Signed distance fields computed from a binary mask.
//!
//! This is the 8-point sequential Euclidean distance transform: every cell stores
//! the offset to its nearest feature, and offsets are propagated from neighbours
//! in a forward and a backward raster scan.

use crate::coverage::Rasterizer;

use font::GlyphOutline;
use math::{AffineTransform, Bitmap, Vec2D};

/// Offset stored in cells that have not seen a feature yet
const FAR_AWAY: Vec2D<i32> = Vec2D::new(9999, 9999);

/// Coverage values above this are part of the mask
const COVERAGE_THRESHOLD: u8 = 127;

#[derive(Clone, Debug)]
struct Grid {
    width: usize,
    height: usize,
    offsets: Vec<Vec2D<i32>>,
}

fn length_squared(offset: Vec2D<i32>) -> i32 {
    offset.x * offset.x + offset.y * offset.y
}

impl Grid {
    /// A grid whose features are the cells for which `is_feature` returns `true`
    fn new(mask: &Bitmap<bool>, is_feature: impl Fn(bool) -> bool) -> Self {
        let offsets = mask
            .data()
            .iter()
            .map(|&cell| {
                if is_feature(cell) {
                    Vec2D::default()
                } else {
                    FAR_AWAY
                }
            })
            .collect();

        Self {
            width: mask.width(),
            height: mask.height(),
            offsets,
        }
    }

    fn get(&self, x: isize, y: isize) -> Vec2D<i32> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return FAR_AWAY;
        }
        self.offsets[y as usize * self.width + x as usize]
    }

    /// Replace the offset at `(x, y)` if the neighbour at `(x + dx, y + dy)` knows a closer feature
    fn compare(&mut self, x: usize, y: usize, dx: i32, dy: i32) {
        let neighbour = self.get(x as isize + dx as isize, y as isize + dy as isize);
        let candidate = Vec2D::new(neighbour.x + dx, neighbour.y + dy);

        let index = y * self.width + x;
        if length_squared(candidate) < length_squared(self.offsets[index]) {
            self.offsets[index] = candidate;
        }
    }

    fn propagate(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.compare(x, y, -1, 0);
                self.compare(x, y, 0, -1);
                self.compare(x, y, -1, -1);
                self.compare(x, y, 1, -1);
            }
            for x in (0..self.width).rev() {
                self.compare(x, y, 1, 0);
            }
        }

        for y in (0..self.height).rev() {
            for x in (0..self.width).rev() {
                self.compare(x, y, 1, 0);
                self.compare(x, y, 0, 1);
                self.compare(x, y, -1, 1);
                self.compare(x, y, 1, 1);
            }
            for x in 0..self.width {
                self.compare(x, y, -1, 0);
            }
        }
    }

    fn distance_at(&self, index: usize) -> f32 {
        (length_squared(self.offsets[index]) as f32).sqrt()
    }
}

/// Compute the signed distance to the edge of a binary mask.
///
/// Values are positive for set cells and negative for unset ones, and are
/// normalized by the larger side of the mask.
#[must_use]
pub fn signed_distance(mask: &Bitmap<bool>) -> Bitmap<f32> {
    let mut to_set = Grid::new(mask, |cell| cell);
    let mut to_unset = Grid::new(mask, |cell| !cell);
    to_set.propagate();
    to_unset.propagate();

    let scale = (mask.width().max(mask.height()).max(1) as f32).recip();
    let data = (0..mask.data().len())
        .map(|index| (to_unset.distance_at(index) - to_set.distance_at(index)) * scale)
        .collect();

    Bitmap::from_data(data, mask.width(), mask.height())
}

/// Rasterize the outline into a mask and compute its distance transform.
///
/// This is much faster than [signed_distance_field](crate::signed_distance_field) but
/// only accurate to about one pixel. Like [signed_distance], the result is positive inside.
#[must_use]
pub fn coarse_sdf(
    outline: &GlyphOutline,
    transform: AffineTransform,
    width: usize,
    height: usize,
) -> Bitmap<f32> {
    let mut rasterizer = Rasterizer::new(width, height);
    rasterizer.draw_outline(outline, transform);

    let mut coverage = Bitmap::new(width, height);
    rasterizer.write_coverage(&mut coverage);

    signed_distance(&coverage.map(|value| value > COVERAGE_THRESHOLD))
}
