//! The binary atlas cache format.
//!
//! All values are little endian:
//!
//! | field | type |
//! |---|---|
//! | magic | `b"SDFA"` |
//! | format version | `u32` |
//! | width, height | `u32`, `u32` |
//! | line height, glyph scale | `f32`, `f32` |
//! | number of ranges, number of indices | `u32`, `u32` |
//! | glyph size, padding, sdf clamp, requested width | `u32`, `u32`, `f32`, `u32` |
//! | font length, font checksum | `u64`, `u32` |
//! | number of requested ranges | `u32` |
//! | requested ranges | `(start: u32, end: u32)` each |
//! | ranges | `(start: u32, end: u32, offset: i32)` each |
//! | indices | nine `f32` each |
//! | image | `width * height` bytes |

use crate::{AtlasSettings, BuildInputs, CodepointRange, FontFingerprint, GlyphAtlas, GlyphIndex};

use math::Vec2D;
use thiserror::Error;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

pub const MAGIC: [u8; 4] = *b"SDFA";

/// Increment this whenever the layout changes
pub const FORMAT_VERSION: u32 = 2;

const HEADER_SIZE: usize = 32;
const INPUTS_SIZE: usize = 32;
const REQUESTED_RANGE_SIZE: usize = 8;
const RANGE_SIZE: usize = 12;
const INDEX_SIZE: usize = 36;

#[derive(Debug, Error)]
pub enum AtlasIoError {
    #[error("failed to access atlas file")]
    Io(#[from] io::Error),

    #[error("refusing to overwrite {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("file is not a glyph atlas")]
    BadMagic,

    #[error("atlas has format version {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("atlas file is truncated")]
    Truncated,

    #[error("atlas file is corrupt: {0}")]
    Corrupt(&'static str),
}

/// Little endian cursor over a serialized atlas
struct Reader<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    fn next_bytes(&mut self, n: usize) -> Result<&'a [u8], AtlasIoError> {
        let end = self.cursor.checked_add(n).ok_or(AtlasIoError::Truncated)?;
        let bytes = self
            .bytes
            .get(self.cursor..end)
            .ok_or(AtlasIoError::Truncated)?;
        self.cursor = end;
        Ok(bytes)
    }

    fn next_chunk<const N: usize>(&mut self) -> Result<[u8; N], AtlasIoError> {
        let mut chunk = [0; N];
        chunk.copy_from_slice(self.next_bytes(N)?);
        Ok(chunk)
    }

    fn next_u32(&mut self) -> Result<u32, AtlasIoError> {
        self.next_chunk().map(u32::from_le_bytes)
    }

    fn next_u64(&mut self) -> Result<u64, AtlasIoError> {
        self.next_chunk().map(u64::from_le_bytes)
    }

    fn next_i32(&mut self) -> Result<i32, AtlasIoError> {
        self.next_chunk().map(i32::from_le_bytes)
    }

    fn next_f32(&mut self) -> Result<f32, AtlasIoError> {
        self.next_u32().map(f32::from_bits)
    }

    fn next_vec2d(&mut self) -> Result<Vec2D, AtlasIoError> {
        Ok(Vec2D::new(self.next_f32()?, self.next_f32()?))
    }

    /// Make sure that `count` elements of `size` bytes can be read, before allocating space for them
    fn expect_elements(&self, count: u32, size: usize) -> Result<(), AtlasIoError> {
        match (count as usize).checked_mul(size) {
            Some(needed) if needed <= self.remaining() => Ok(()),
            _ => Err(AtlasIoError::Truncated),
        }
    }
}

fn write_vec2d(bytes: &mut Vec<u8>, vec: Vec2D) {
    bytes.extend_from_slice(&vec.x.to_bits().to_le_bytes());
    bytes.extend_from_slice(&vec.y.to_bits().to_le_bytes());
}

impl GlyphAtlas {
    /// Serialize the atlas into the binary cache format
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(
            HEADER_SIZE
                + INPUTS_SIZE
                + self.inputs.requested_ranges.len() * REQUESTED_RANGE_SIZE
                + self.ranges.len() * RANGE_SIZE
                + self.indices.len() * INDEX_SIZE
                + self.image.len(),
        );

        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&self.width.to_le_bytes());
        bytes.extend_from_slice(&self.height.to_le_bytes());
        bytes.extend_from_slice(&self.line_height.to_bits().to_le_bytes());
        bytes.extend_from_slice(&self.glyph_scale.to_bits().to_le_bytes());
        bytes.extend_from_slice(&(self.ranges.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.indices.len() as u32).to_le_bytes());

        let BuildInputs {
            settings,
            font,
            requested_ranges,
        } = &self.inputs;
        bytes.extend_from_slice(&settings.glyph_size.to_le_bytes());
        bytes.extend_from_slice(&settings.padding.to_le_bytes());
        bytes.extend_from_slice(&settings.sdf_clamp.to_bits().to_le_bytes());
        bytes.extend_from_slice(&settings.width.to_le_bytes());
        bytes.extend_from_slice(&font.length.to_le_bytes());
        bytes.extend_from_slice(&font.checksum.to_le_bytes());
        bytes.extend_from_slice(&(requested_ranges.len() as u32).to_le_bytes());
        for range in requested_ranges {
            bytes.extend_from_slice(&range.start().to_le_bytes());
            bytes.extend_from_slice(&range.end().to_le_bytes());
        }

        for range in &self.ranges {
            bytes.extend_from_slice(&range.start.to_le_bytes());
            bytes.extend_from_slice(&range.end.to_le_bytes());
            bytes.extend_from_slice(&range.offset.to_le_bytes());
        }

        for index in &self.indices {
            write_vec2d(&mut bytes, index.uv_position);
            write_vec2d(&mut bytes, index.uv_size);
            write_vec2d(&mut bytes, index.size);
            write_vec2d(&mut bytes, index.bearing);
            bytes.extend_from_slice(&index.advance.to_bits().to_le_bytes());
        }

        bytes.extend_from_slice(&self.image);
        bytes
    }

    /// Parse an atlas in the binary cache format
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AtlasIoError> {
        let mut reader = Reader::new(bytes);

        let magic: [u8; 4] = reader.next_chunk()?;
        if magic != MAGIC {
            return Err(AtlasIoError::BadMagic);
        }

        let version = reader.next_u32()?;
        if version != FORMAT_VERSION {
            return Err(AtlasIoError::VersionMismatch {
                found: version,
                expected: FORMAT_VERSION,
            });
        }

        let width = reader.next_u32()?;
        let height = reader.next_u32()?;
        let line_height = reader.next_f32()?;
        let glyph_scale = reader.next_f32()?;
        let num_ranges = reader.next_u32()?;
        let num_indices = reader.next_u32()?;

        let settings = AtlasSettings {
            glyph_size: reader.next_u32()?,
            padding: reader.next_u32()?,
            sdf_clamp: reader.next_f32()?,
            width: reader.next_u32()?,
        };
        let font = FontFingerprint {
            length: reader.next_u64()?,
            checksum: reader.next_u32()?,
        };

        let num_requested_ranges = reader.next_u32()?;
        reader.expect_elements(num_requested_ranges, REQUESTED_RANGE_SIZE)?;
        let mut requested_ranges = Vec::with_capacity(num_requested_ranges as usize);
        for _ in 0..num_requested_ranges {
            requested_ranges.push(reader.next_u32()?..=reader.next_u32()?);
        }

        reader.expect_elements(num_ranges, RANGE_SIZE)?;
        let mut ranges = Vec::with_capacity(num_ranges as usize);
        for _ in 0..num_ranges {
            ranges.push(CodepointRange {
                start: reader.next_u32()?,
                end: reader.next_u32()?,
                offset: reader.next_i32()?,
            });
        }

        reader.expect_elements(num_indices, INDEX_SIZE)?;
        let mut indices = Vec::with_capacity(num_indices as usize);
        for _ in 0..num_indices {
            indices.push(GlyphIndex {
                uv_position: reader.next_vec2d()?,
                uv_size: reader.next_vec2d()?,
                size: reader.next_vec2d()?,
                bearing: reader.next_vec2d()?,
                advance: reader.next_f32()?,
            });
        }

        let image_size = (width as usize)
            .checked_mul(height as usize)
            .ok_or(AtlasIoError::Corrupt("image is too large"))?;
        let image = reader.next_bytes(image_size)?.to_vec();
        if reader.remaining() != 0 {
            log::warn!(
                "Ignoring {} trailing bytes after glyph atlas",
                reader.remaining()
            );
        }

        let atlas = Self {
            width,
            height,
            line_height,
            glyph_scale,
            ranges,
            indices,
            image,
            inputs: BuildInputs {
                settings,
                font,
                requested_ranges,
            },
        };
        atlas.validate()?;
        Ok(atlas)
    }

    /// Check that every range resolves to existing glyph indices
    fn validate(&self) -> Result<(), AtlasIoError> {
        if self.indices.is_empty() {
            return Err(AtlasIoError::Corrupt("missing glyph is not present"));
        }

        for range in &self.ranges {
            if range.start > range.end {
                return Err(AtlasIoError::Corrupt("codepoint range is reversed"));
            }

            let first = i64::from(range.start) + i64::from(range.offset);
            let last = i64::from(range.end) + i64::from(range.offset);
            if first < 1 || last >= self.indices.len() as i64 {
                return Err(AtlasIoError::Corrupt(
                    "codepoint range points outside of the glyph indices",
                ));
            }
        }

        if self.ranges.windows(2).any(|pair| pair[0].end >= pair[1].start) {
            return Err(AtlasIoError::Corrupt("codepoint ranges are not sorted"));
        }

        Ok(())
    }

    /// Write the atlas to disk in the binary cache format.
    ///
    /// Unless `overwrite` is `true`, existing files are left untouched and an error is returned.
    pub fn save<P: AsRef<Path>>(&self, path: P, overwrite: bool) -> Result<(), AtlasIoError> {
        let path = path.as_ref();

        let mut file = if overwrite {
            fs::File::create(path)?
        } else {
            fs::File::options()
                .write(true)
                .create_new(true)
                .open(path)
                .map_err(|error| match error.kind() {
                    io::ErrorKind::AlreadyExists => AtlasIoError::AlreadyExists(path.to_path_buf()),
                    _ => AtlasIoError::Io(error),
                })?
        };

        file.write_all(&self.to_bytes())?;
        log::info!(
            "Saved {}x{} glyph atlas to {}",
            self.width,
            self.height,
            path.display()
        );
        Ok(())
    }

    /// Read an atlas that was previously [saved](Self::save)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AtlasIoError> {
        let path = path.as_ref();
        let atlas = Self::from_bytes(&fs::read(path)?)?;

        log::info!(
            "Loaded {}x{} glyph atlas with {} glyph indices from {}",
            atlas.width,
            atlas.height,
            atlas.indices.len(),
            path.display()
        );
        Ok(atlas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_atlas() -> GlyphAtlas {
        GlyphAtlas {
            width: 4,
            height: 2,
            line_height: 1.1,
            glyph_scale: 32.,
            ranges: vec![CodepointRange {
                start: 65,
                end: 66,
                offset: -64,
            }],
            indices: vec![
                GlyphIndex::default(),
                GlyphIndex {
                    uv_position: Vec2D::new(0.25, 0.),
                    uv_size: Vec2D::new(0.5, 1.),
                    size: Vec2D::new(0.0625, 0.0625),
                    bearing: Vec2D::new(-0.1, 0.9),
                    advance: 0.7,
                },
                GlyphIndex {
                    advance: 0.5,
                    ..Default::default()
                },
            ],
            image: vec![0, 1, 2, 3, 4, 5, 6, 255],
            inputs: BuildInputs {
                settings: AtlasSettings {
                    width: 4,
                    ..Default::default()
                },
                font: FontFingerprint {
                    length: 1 << 40,
                    checksum: 0xCBF43926,
                },
                requested_ranges: vec![65..=66, 0x1F600..=0x1F600],
            },
        }
    }

    #[test]
    fn header_layout() {
        let bytes = small_atlas().to_bytes();

        assert_eq!(&bytes[..4], b"SDFA");
        assert_eq!(&bytes[4..8], &FORMAT_VERSION.to_le_bytes());
        assert_eq!(&bytes[8..12], &4_u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &2_u32.to_le_bytes());
        assert_eq!(&bytes[24..28], &1_u32.to_le_bytes());
        assert_eq!(&bytes[28..32], &3_u32.to_le_bytes());
        assert_eq!(&bytes[32..36], &32_u32.to_le_bytes());
        assert_eq!(&bytes[44..48], &4_u32.to_le_bytes());
        assert_eq!(&bytes[48..56], &(1_u64 << 40).to_le_bytes());
        assert_eq!(&bytes[60..64], &2_u32.to_le_bytes());
        assert_eq!(
            bytes.len(),
            HEADER_SIZE + INPUTS_SIZE + 2 * REQUESTED_RANGE_SIZE + RANGE_SIZE + 3 * INDEX_SIZE + 8
        );
    }

    #[test]
    fn parse_serialized_atlas() {
        let atlas = small_atlas();
        assert_eq!(GlyphAtlas::from_bytes(&atlas.to_bytes()).unwrap(), atlas);
    }

    #[test]
    fn reject_foreign_files() {
        let mut bytes = small_atlas().to_bytes();

        bytes[4] = 99;
        assert!(matches!(
            GlyphAtlas::from_bytes(&bytes),
            Err(AtlasIoError::VersionMismatch {
                found: 99,
                expected: FORMAT_VERSION
            })
        ));

        bytes[0] = b'X';
        assert!(matches!(
            GlyphAtlas::from_bytes(&bytes),
            Err(AtlasIoError::BadMagic)
        ));
        assert!(matches!(
            GlyphAtlas::from_bytes(b"SD"),
            Err(AtlasIoError::Truncated)
        ));
    }

    #[test]
    fn reject_truncated_files() {
        let bytes = small_atlas().to_bytes();
        for length in [
            8,
            HEADER_SIZE,
            HEADER_SIZE + 20,
            HEADER_SIZE + INPUTS_SIZE + 4,
            bytes.len() - 1,
        ] {
            assert!(
                matches!(
                    GlyphAtlas::from_bytes(&bytes[..length]),
                    Err(AtlasIoError::Truncated)
                ),
                "length {length}"
            );
        }
    }

    #[test]
    fn reject_dangling_ranges() {
        let mut atlas = small_atlas();
        atlas.ranges[0].end = 70;
        assert!(matches!(
            GlyphAtlas::from_bytes(&atlas.to_bytes()),
            Err(AtlasIoError::Corrupt(_))
        ));

        let mut atlas = small_atlas();
        atlas.indices.clear();
        atlas.ranges.clear();
        assert!(matches!(
            GlyphAtlas::from_bytes(&atlas.to_bytes()),
            Err(AtlasIoError::Corrupt(_))
        ));
    }

    #[test]
    fn huge_counts_do_not_allocate() {
        for count_offset in [24, 28, 60] {
            let mut bytes = small_atlas().to_bytes();
            bytes[count_offset..count_offset + 4].copy_from_slice(&u32::MAX.to_le_bytes());
            assert!(
                matches!(GlyphAtlas::from_bytes(&bytes), Err(AtlasIoError::Truncated)),
                "count at {count_offset}"
            );
        }
    }
}
