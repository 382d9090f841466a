//! Reading and writing uncompressed images.

pub mod bmp;

/// An image with one `[red, green, blue]` triple per pixel
pub type RgbImage = math::Bitmap<[u8; 3]>;
