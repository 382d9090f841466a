//! Big-endian decoding of the primitive types found in font files.

use thiserror::Error;

/// The font data ended before a value could be read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("unexpected end of font data")]
pub struct UnexpectedEof;

#[inline]
pub fn read_u16_at(data: &[u8], offset: usize) -> Result<u16, UnexpectedEof> {
    read_array_at(data, offset).map(u16::from_be_bytes)
}

#[inline]
pub fn read_i16_at(data: &[u8], offset: usize) -> Result<i16, UnexpectedEof> {
    read_array_at(data, offset).map(i16::from_be_bytes)
}

#[inline]
pub fn read_u32_at(data: &[u8], offset: usize) -> Result<u32, UnexpectedEof> {
    read_array_at(data, offset).map(u32::from_be_bytes)
}

#[inline]
pub fn read_i32_at(data: &[u8], offset: usize) -> Result<i32, UnexpectedEof> {
    read_array_at(data, offset).map(i32::from_be_bytes)
}

#[inline]
fn read_array_at<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], UnexpectedEof> {
    let end = offset.checked_add(N).ok_or(UnexpectedEof)?;
    data.get(offset..end)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(UnexpectedEof)
}

/// Convert a signed `2.14` fixed point number to a float
#[inline]
#[must_use]
pub fn f2dot14_to_f32(value: i16) -> f32 {
    f32::from(value) / 16384.
}

/// A cursor over a byte slice that reads big-endian values front to back.
#[derive(Clone, Copy, Debug)]
pub struct Stream<'a> {
    bytes: &'a [u8],
    ptr: usize,
}

impl<'a> Stream<'a> {
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, ptr: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.ptr
    }

    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.ptr.min(self.bytes.len())..]
    }

    #[inline]
    pub fn skip_bytes(&mut self, n: usize) -> Result<(), UnexpectedEof> {
        let new_ptr = self.ptr.checked_add(n).ok_or(UnexpectedEof)?;
        if new_ptr > self.bytes.len() {
            return Err(UnexpectedEof);
        }
        self.ptr = new_ptr;
        Ok(())
    }

    pub fn read<T: Readable>(&mut self) -> Result<T, UnexpectedEof> {
        let value = T::read(&self.bytes[self.ptr.min(self.bytes.len())..])?;
        self.ptr += T::SIZE;
        Ok(value)
    }
}

pub trait Readable: Sized {
    const SIZE: usize;

    fn read(bytes: &[u8]) -> Result<Self, UnexpectedEof>;
}

macro_rules! impl_readable {
    ($t: ty, $n: expr) => {
        impl Readable for $t {
            const SIZE: usize = $n;

            #[inline]
            fn read(bytes: &[u8]) -> Result<Self, UnexpectedEof> {
                read_array_at(bytes, 0).map(<$t>::from_be_bytes)
            }
        }
    };
}

impl_readable!(u8, 1);
impl_readable!(i8, 1);
impl_readable!(u16, 2);
impl_readable!(i16, 2);
impl_readable!(u32, 4);
impl_readable!(i32, 4);
