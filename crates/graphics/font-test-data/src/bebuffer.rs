//! A buffer of big-endian values

/// Values that can be written to a [BeBuffer]
pub trait Scalar: Copy {
    fn write_be(self, out: &mut Vec<u8>);
}

macro_rules! impl_scalar {
    ($($t: ty),*) => {
        $(
            impl Scalar for $t {
                fn write_be(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_be_bytes());
                }
            }
        )*
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32);

impl Scalar for [u8; 4] {
    fn write_be(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self);
    }
}

/// A convenience type for generating a buffer of big-endian bytes.
#[derive(Clone, Debug, Default)]
pub struct BeBuffer {
    data: Vec<u8>,
}

impl BeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Write any scalar to this buffer.
    pub fn push(mut self, item: impl Scalar) -> Self {
        item.write_be(&mut self.data);
        self
    }

    /// Write multiple scalars into the buffer
    pub fn extend<T: Scalar>(mut self, iter: impl IntoIterator<Item = T>) -> Self {
        for item in iter {
            item.write_be(&mut self.data);
        }
        self
    }

    pub fn extend_from_slice(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Append zero bytes until the length is a multiple of `alignment`
    pub fn align_to(mut self, alignment: usize) -> Self {
        while self.data.len() % alignment != 0 {
            self.data.push(0);
        }
        self
    }

    /// Overwrite a previously written value
    pub fn write_at(&mut self, offset: usize, item: impl Scalar) {
        let mut raw = vec![];
        item.write_be(&mut raw);
        self.data[offset..offset + raw.len()].copy_from_slice(&raw);
    }
}

/// Build a [BeBuffer] from a list of scalars
#[macro_export]
macro_rules! be_buffer {
    ($($item: expr),* $(,)?) => {{
        let buffer = $crate::bebuffer::BeBuffer::new();
        $(let buffer = buffer.push($item);)*
        buffer
    }};
}
