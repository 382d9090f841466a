/// Reversed representation of the CRC-32 polynomial used by zlib, png and friends
const POLYNOMIAL: u32 = 0xEDB88320;

const CRC32_TABLE: [u32; 256] = make_table();

const fn make_table() -> [u32; 256] {
    let mut table = [0; 256];
    let mut index = 0;
    while index < 256 {
        let mut value = index as u32;
        let mut bit = 0;
        while bit < 8 {
            value = if value & 1 == 1 {
                (value >> 1) ^ POLYNOMIAL
            } else {
                value >> 1
            };
            bit += 1;
        }
        table[index] = value;
        index += 1;
    }
    table
}

pub fn crc32(bytes: &[u8]) -> u32 {
    let mut hasher = Crc32Hasher::default();
    hasher.write(bytes);
    hasher.finish()
}

/// Computes a CRC-32 over data that arrives in pieces
#[derive(Clone, Copy, Debug)]
pub struct Crc32Hasher(u32);

impl Default for Crc32Hasher {
    fn default() -> Self {
        Self(u32::MAX)
    }
}

impl Crc32Hasher {
    pub fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            let lookup_index = (self.0 & 0xFF) as u8 ^ byte;
            self.0 = (self.0 >> 8) ^ CRC32_TABLE[lookup_index as usize];
        }
    }

    #[must_use]
    pub fn finish(self) -> u32 {
        !self.0
    }
}
