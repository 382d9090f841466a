//! Shelf packing: rectangles are placed left to right in rows, a new row is
//! started once the current one is full.

use math::{Rectangle, Vec2D};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RectangleTooWide {
    pub width: u32,
    pub max_width: u32,
}

#[derive(Clone, Debug)]
pub struct ShelfPacker {
    width: u32,
    padding: u32,

    /// Where the next rectangle on the current shelf goes
    cursor: Vec2D<u32>,

    /// Height of the tallest rectangle on the current shelf
    shelf_height: u32,
}

impl ShelfPacker {
    #[must_use]
    pub fn new(width: u32, padding: u32) -> Self {
        Self {
            width,
            padding,
            cursor: Vec2D::new(padding, padding),
            shelf_height: 0,
        }
    }

    /// The widest rectangle that can be packed
    #[must_use]
    pub fn max_width(&self) -> u32 {
        self.width.saturating_sub(2 * self.padding)
    }

    /// Find a place for a rectangle of the given size.
    ///
    /// Rectangles are kept at least `padding` pixels away from each other and from
    /// the border. Packing works best if rectangles are sorted by height, tallest first.
    pub fn pack(&mut self, width: u32, height: u32) -> Result<Rectangle<u32>, RectangleTooWide> {
        if width > self.max_width() {
            return Err(RectangleTooWide {
                width,
                max_width: self.max_width(),
            });
        }

        if self.cursor.x + width + self.padding > self.width {
            // Start a new shelf
            self.cursor = Vec2D::new(
                self.padding,
                self.cursor.y + self.shelf_height + self.padding,
            );
            self.shelf_height = 0;
        }

        let placed = Rectangle::from_position_and_size(self.cursor, width, height);
        self.cursor.x += width + self.padding;
        self.shelf_height = self.shelf_height.max(height);
        Ok(placed)
    }

    /// The height needed to contain everything packed so far, including the bottom padding
    #[must_use]
    pub fn height(&self) -> u32 {
        self.cursor.y + self.shelf_height + self.padding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_shelves() {
        let mut packer = ShelfPacker::new(20, 1);

        let a = packer.pack(8, 5).unwrap();
        let b = packer.pack(8, 4).unwrap();
        let c = packer.pack(8, 3).unwrap();

        assert_eq!(a, Rectangle::from_position_and_size(Vec2D::new(1, 1), 8, 5));
        assert_eq!(b, Rectangle::from_position_and_size(Vec2D::new(10, 1), 8, 4));

        // 19 + 8 + 1 does not fit into 20 pixels
        assert_eq!(c, Rectangle::from_position_and_size(Vec2D::new(1, 7), 8, 3));
        assert_eq!(packer.height(), 11);
    }

    #[test]
    fn exact_fit() {
        let mut packer = ShelfPacker::new(10, 1);
        assert_eq!(packer.max_width(), 8);

        let placed = packer.pack(8, 2).unwrap();
        assert_eq!(placed.bottom_right(), Vec2D::new(9, 3));

        assert_eq!(
            packer.pack(9, 1),
            Err(RectangleTooWide {
                width: 9,
                max_width: 8
            })
        );
    }

    #[test]
    fn empty_packer() {
        let packer = ShelfPacker::new(64, 2);
        assert_eq!(packer.height(), 4);
    }
}
