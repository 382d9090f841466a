/// An owned, row-major `width × height` grid of pixels
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap<T: Copy> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Default + Copy> Bitmap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Copy> Bitmap<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn from_data(data: Vec<T>, width: usize, height: usize) -> Self {
        debug_assert_eq!(data.len(), width * height);

        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Set the pixel at the given coordinates to the specified value.
    ///
    /// # Panics
    /// This function panics if the coordinates are outside of the bitmap
    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: T) {
        let index = self.index_of_pixel(x, y);
        self.data[index] = pixel;
    }

    /// Get the pixel value at the given coordinates
    ///
    /// # Panics
    /// This function panics if the coordinates are outside of the bitmap
    pub fn get_pixel(&self, x: usize, y: usize) -> T {
        self.data[self.index_of_pixel(x, y)]
    }

    /// Access a pixel, returning `None` if the coordinates are outside the bitmap
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// Calculate the index of the pixel data for a given set of coordinates
    fn index_of_pixel(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width);
        debug_assert!(y < self.height);

        y * self.width + x
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// The pixels of row `y`, from left to right
    pub fn row(&self, y: usize) -> &[T] {
        &self.data[y * self.width..][..self.width]
    }

    pub fn clear(&mut self, clear_color: T) {
        self.data.fill(clear_color);
    }

    /// Apply `f` to every pixel, producing a bitmap of the same dimensions
    pub fn map<U: Copy, F: FnMut(T) -> U>(&self, f: F) -> Bitmap<U> {
        Bitmap {
            width: self.width,
            height: self.height,
            data: self.data.iter().copied().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Bitmap;

    #[test]
    fn set_and_get() {
        let mut bitmap: Bitmap<u8> = Bitmap::new(3, 2);
        bitmap.set_pixel(2, 1, 7);
        assert_eq!(bitmap.get_pixel(2, 1), 7);
        assert_eq!(bitmap.data()[5], 7);
        assert_eq!(bitmap.row(1), &[0, 0, 7]);
        assert_eq!(bitmap.get(3, 0), None);
    }

    #[test]
    fn map_pixels() {
        let bitmap = Bitmap::filled(2, 2, 1.5_f32);
        let mapped = bitmap.map(|value| (value * 2.) as u8);
        assert_eq!(mapped.data(), &[3, 3, 3, 3]);
    }
}
