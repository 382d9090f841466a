//! Signed distance fields for glyph outlines.
//!
//! There are two ways to compute a field:
//! * [signed_distance_field] measures the exact distance to every curve of the outline.
//!   This is slow but precise and what glyph atlases use.
//! * [coarse_sdf] rasterizes the outline into a binary mask first and runs a
//!   distance transform on that.

mod coverage;
pub mod cubic;
mod distance_transform;
mod exact;
mod quantize;

pub use coverage::Rasterizer;
pub use cubic::solve_cubic;
pub use distance_transform::{coarse_sdf, signed_distance};
pub use exact::signed_distance_field;
pub use quantize::{quantize, quantize_distance};
