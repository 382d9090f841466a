//! Common utilities used in graphics-related libraries

mod bitmap;
mod rect;
mod transform;
mod vec2d;

pub use bitmap::Bitmap;
pub use rect::Rectangle;
pub use transform::AffineTransform;
pub use vec2d::Vec2D;
