//! The `.bmp` file format
//!
//! Only uncompressed 24 bit images are supported, which is all that is needed
//! to dump grayscale glyph atlases.
//!
//! Information about the format can be found at
//! * <http://www.ece.ualberta.ca/~elliott/ee552/studentAppNotes/2003_w/misc/bmp_file_format/bmp_file_format.htm>
//! * <http://www.martinreddy.net/gfx/2d/BMP.txt>

use crate::RgbImage;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

const BMP_MAGIC: [u8; 2] = [0x42, 0x4d];

const FILE_HEADER_SIZE: u32 = 14;
const INFO_HEADER_SIZE: u32 = 40;
const HEADER_SIZE: u32 = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

/// Roughly 2835 pixels per meter are 72 DPI
const PIXELS_PER_METER: u32 = 2835;

const MAX_ACCEPTABLE_SIZE: u32 = 16384;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to access image file")]
    Io(#[from] io::Error),

    #[error("refusing to overwrite {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("file is not a bmp image")]
    NotABmp,

    #[error("unexpected end of file")]
    UnexpectedEndOfFile,

    /// The image uses a feature that is not supported, like compression or palettes
    #[error("unsupported bmp format")]
    UnsupportedFormat,
}

/// Write a 24 bit `.bmp` image to the given path.
///
/// `pixel` is called with the coordinates of every pixel, `(0, 0)` is the top left corner.
/// Unless `overwrite` is `true`, existing files are left untouched and an error is returned.
pub fn save<P, F>(path: P, width: u32, height: u32, pixel: F, overwrite: bool) -> Result<(), Error>
where
    P: AsRef<Path>,
    F: FnMut(u32, u32) -> [u8; 3],
{
    let path = path.as_ref();

    let file = if overwrite {
        fs::File::create(path)?
    } else {
        fs::File::options()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|error| match error.kind() {
                io::ErrorKind::AlreadyExists => Error::AlreadyExists(path.to_path_buf()),
                _ => Error::Io(error),
            })?
    };

    let mut writer = io::BufWriter::new(file);
    encode(&mut writer, width, height, pixel)?;
    writer.flush()?;

    log::debug!("Wrote {width}x{height} bmp image to {}", path.display());
    Ok(())
}

/// Encode a 24 bit `.bmp` image into `writer`
pub fn encode<W, F>(writer: &mut W, width: u32, height: u32, mut pixel: F) -> io::Result<()>
where
    W: Write,
    F: FnMut(u32, u32) -> [u8; 3],
{
    let scanline_width = align_up::<4>(3 * width as usize);
    let image_size = (scanline_width * height as usize) as u32;

    // File header
    writer.write_all(&BMP_MAGIC)?;
    writer.write_all(&(HEADER_SIZE + image_size).to_le_bytes())?;
    writer.write_all(&0_u32.to_le_bytes())?;
    writer.write_all(&HEADER_SIZE.to_le_bytes())?;

    // Info header
    writer.write_all(&INFO_HEADER_SIZE.to_le_bytes())?;
    writer.write_all(&width.to_le_bytes())?;
    writer.write_all(&height.to_le_bytes())?;
    writer.write_all(&1_u16.to_le_bytes())?;
    writer.write_all(&24_u16.to_le_bytes())?;
    writer.write_all(&0_u32.to_le_bytes())?;
    writer.write_all(&image_size.to_le_bytes())?;
    writer.write_all(&PIXELS_PER_METER.to_le_bytes())?;
    writer.write_all(&PIXELS_PER_METER.to_le_bytes())?;
    writer.write_all(&0_u32.to_le_bytes())?;
    writer.write_all(&0_u32.to_le_bytes())?;

    // Scanlines are stored bottom to top
    let mut scanline = vec![0; scanline_width];
    for y in (0..height).rev() {
        for (x, bgr) in scanline.chunks_exact_mut(3).take(width as usize).enumerate() {
            let [red, green, blue] = pixel(x as u32, y);
            bgr.copy_from_slice(&[blue, green, red]);
        }
        writer.write_all(&scanline)?;
    }

    Ok(())
}

/// Little-endian cursor over the bytes of a file
struct Reader<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    fn next_chunk<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let chunk = self
            .bytes
            .get(self.cursor..self.cursor + N)
            .ok_or(Error::UnexpectedEndOfFile)?;
        self.cursor += N;

        let mut result = [0; N];
        result.copy_from_slice(chunk);
        Ok(result)
    }

    fn next_le_u16(&mut self) -> Result<u16, Error> {
        self.next_chunk().map(u16::from_le_bytes)
    }

    fn next_le_u32(&mut self) -> Result<u32, Error> {
        self.next_chunk().map(u32::from_le_bytes)
    }

    fn next_le_i32(&mut self) -> Result<i32, Error> {
        self.next_chunk().map(i32::from_le_bytes)
    }
}

/// Decode an uncompressed 24 bit `.bmp` image
pub fn decode(bytes: &[u8]) -> Result<RgbImage, Error> {
    let mut reader = Reader::new(bytes);

    // Start of header
    let magic: [u8; 2] = reader.next_chunk()?;
    if magic != BMP_MAGIC {
        return Err(Error::NotABmp);
    }

    let file_size = reader.next_le_u32()?;
    if file_size as usize != bytes.len() {
        log::warn!(
            "bmp header states that the file size is 0x{file_size:x} bytes, but its 0x{:x}",
            bytes.len()
        );
    }

    let reserved = reader.next_le_u32()?;
    if reserved != 0 {
        log::warn!("Reserved field in bmp header is not zero (it is 0x{reserved:x})")
    }

    let image_data_offset = reader.next_le_u32()?;

    // Start of the Info Header
    let info_header_size = reader.next_le_u32()?;
    if info_header_size != INFO_HEADER_SIZE {
        log::warn!("Incorrect bmp info header size: Should be 40, is {info_header_size:?}");
    }

    let width = reader.next_le_u32()?;

    // Negative heights mark images that are stored top to bottom
    let height = reader.next_le_i32()?;
    let top_down = height.is_negative();
    let height = height.unsigned_abs();

    let planes = reader.next_le_u16()?;
    if planes != 1 {
        log::warn!("Unexpected number of planes, expected 1, got {planes:?}");
    }

    let bits_per_pixel = reader.next_le_u16()?;
    let compression = reader.next_le_u32()?;
    if bits_per_pixel != 24 || compression != 0 {
        log::error!(
            "Unsupported bmp image with {bits_per_pixel} bits per pixel and compression {compression}"
        );
        return Err(Error::UnsupportedFormat);
    }

    if width > MAX_ACCEPTABLE_SIZE || height > MAX_ACCEPTABLE_SIZE {
        log::error!("Refusing to allocate image of size {width}x{height}");
        return Err(Error::UnsupportedFormat);
    }

    let image_data = bytes
        .get(image_data_offset as usize..)
        .ok_or(Error::UnexpectedEndOfFile)?;

    let scanline_width = align_up::<4>(3 * width as usize);
    if image_data.len() < scanline_width * height as usize {
        return Err(Error::UnexpectedEndOfFile);
    }

    let mut image = RgbImage::new(width as usize, height as usize);
    for (index, scanline) in image_data
        .chunks_exact(scanline_width)
        .take(height as usize)
        .enumerate()
    {
        let y = if top_down {
            index
        } else {
            height as usize - index - 1
        };

        for (x, pixel) in scanline.chunks_exact(3).take(width as usize).enumerate() {
            let blue = pixel[0];
            let green = pixel[1];
            let red = pixel[2];
            image.set_pixel(x, y, [red, green, blue]);
        }
    }

    Ok(image)
}

#[must_use]
fn align_up<const N: usize>(x: usize) -> usize {
    (x + N - 1) & !(N - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(x: u32, y: u32) -> [u8; 3] {
        [(x * 40) as u8, (y * 40) as u8, 7]
    }

    #[test]
    fn alignment() {
        assert_eq!(align_up::<4>(0), 0);
        assert_eq!(align_up::<4>(3), 4);
        assert_eq!(align_up::<4>(9), 12);
        assert_eq!(align_up::<4>(12), 12);
    }

    #[test]
    fn encode_header() {
        let mut bytes = vec![];
        encode(&mut bytes, 3, 2, gradient).unwrap();

        // Each scanline is 9 bytes of pixels plus 3 bytes of padding
        assert_eq!(bytes.len(), 54 + 2 * 12);
        assert_eq!(&bytes[..2], b"BM");
        assert_eq!(&bytes[2..6], &78_u32.to_le_bytes());
        assert_eq!(&bytes[10..14], &54_u32.to_le_bytes());

        // The first scanline is the bottom row, stored as blue, green, red
        assert_eq!(&bytes[54..57], &[7, 40, 0]);
    }

    #[test]
    fn decode_encoded_image() {
        let mut bytes = vec![];
        encode(&mut bytes, 5, 3, gradient).unwrap();

        let image = decode(&bytes).unwrap();
        assert_eq!(image.width(), 5);
        assert_eq!(image.height(), 3);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(image.get_pixel(x, y), gradient(x as u32, y as u32));
            }
        }
    }

    #[test]
    fn reject_invalid_images() {
        assert!(matches!(decode(b"PNG not a bmp"), Err(Error::NotABmp)));
        assert!(matches!(decode(b"BM"), Err(Error::UnexpectedEndOfFile)));

        let mut bytes = vec![];
        encode(&mut bytes, 4, 4, gradient).unwrap();
        assert!(matches!(
            decode(&bytes[..bytes.len() - 1]),
            Err(Error::UnexpectedEndOfFile)
        ));

        // Claim 8 bits per pixel
        bytes[28] = 8;
        assert!(matches!(decode(&bytes), Err(Error::UnsupportedFormat)));
    }
}
