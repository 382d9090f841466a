//! Non-cryptographic checksums.

mod crc32;

pub use crc32::{crc32, Crc32Hasher};
