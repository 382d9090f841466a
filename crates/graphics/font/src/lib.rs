//! TrueType font parsing and glyph outline decoding.
//!
//! Glyph outlines are decoded into a normalized coordinate space in which the bounding box
//! of every glyph in the font fits into the unit square. From there they can be
//! [reconstructed](outline::GlyphOutline::reconstruct) into a sequence of quadratic bezier curves.

pub mod outline;
pub mod path;
mod stream;
pub mod ttf;
pub mod ttf_tables;

pub use outline::{GlyphMetrics, GlyphOutline, Point};
pub use path::QuadraticBezier;
pub use stream::{Readable, Stream, UnexpectedEof};
pub use ttf::{Font, FontOpenError, GlyphDecodeError};
pub use ttf_tables::{cmap::GlyphID, offset::Tag};
