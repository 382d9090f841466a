//! The table directory at the start of every font file.

use crate::{
    stream::{read_u16_at, read_u32_at, UnexpectedEof},
    ttf::FontOpenError,
};
use std::fmt;

/// Scaler types that identify a font we know how to read.
const ACCEPTED_SCALER_TYPES: [u32; 4] = [
    0x0001_0000,
    u32::from_be_bytes(*b"true"),
    u32::from_be_bytes(*b"typ1"),
    u32::from_be_bytes(*b"OTTO"),
];

/// A four byte table identifier, like `glyf` or `cmap`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(u32);

impl Tag {
    pub const CMAP: Self = Self::new(b"cmap");
    pub const GLYF: Self = Self::new(b"glyf");
    pub const HEAD: Self = Self::new(b"head");
    pub const HHEA: Self = Self::new(b"hhea");
    pub const HMTX: Self = Self::new(b"hmtx");
    pub const LOCA: Self = Self::new(b"loca");
    pub const MAXP: Self = Self::new(b"maxp");

    #[inline]
    #[must_use]
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Self(u32::from_be_bytes(*bytes))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.to_be_bytes() {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{byte:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

#[derive(Clone, Debug)]
pub struct OffsetTable {
    tables: Vec<TableEntry>,
}

impl OffsetTable {
    pub fn new(data: &[u8]) -> Result<Self, FontOpenError> {
        let scaler_type = read_u32_at(data, 0)?;
        if !ACCEPTED_SCALER_TYPES.contains(&scaler_type) {
            return Err(FontOpenError::InvalidSignature(scaler_type));
        }

        let num_tables = read_u16_at(data, 4)? as usize;

        // 12 byte header + 16 bytes per table
        let mut tables = Vec::with_capacity(num_tables);
        for i in 0..num_tables {
            tables.push(TableEntry::new(data, 12 + 16 * i)?);
        }

        // Table records are required to be sorted by tag, but some fonts don't care
        if !tables.windows(2).all(|pair| pair[0].tag <= pair[1].tag) {
            log::warn!("Font table directory is not sorted by tag");
            tables.sort_by_key(TableEntry::tag);
        }

        Ok(Self { tables })
    }

    #[inline]
    #[must_use]
    pub fn get_table(&self, target_tag: Tag) -> Option<TableEntry> {
        self.tables
            .binary_search_by_key(&target_tag, TableEntry::tag)
            .ok()
            .map(|index| self.tables[index])
    }

    /// Look up a table that the font cannot be used without
    pub fn require_table(&self, target_tag: Tag) -> Result<TableEntry, FontOpenError> {
        self.get_table(target_tag)
            .ok_or(FontOpenError::MissingTable(target_tag))
    }

    #[inline]
    #[must_use]
    pub fn tables(&self) -> &[TableEntry] {
        &self.tables
    }
}

#[derive(Clone, Copy)]
pub struct TableEntry {
    tag: Tag,
    checksum: u32,
    offset: u32,
    length: u32,
}

impl TableEntry {
    fn new(data: &[u8], offset: usize) -> Result<Self, UnexpectedEof> {
        Ok(Self {
            tag: Tag(read_u32_at(data, offset)?),
            checksum: read_u32_at(data, offset + 4)?,
            offset: read_u32_at(data, offset + 8)?,
            length: read_u32_at(data, offset + 12)?,
        })
    }

    #[inline]
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    #[inline]
    #[must_use]
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset as usize
    }

    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length as usize
    }

    /// The bytes of the table within the font file
    pub fn data<'a>(&self, font_data: &'a [u8]) -> Result<&'a [u8], FontOpenError> {
        let end = self
            .offset()
            .checked_add(self.length())
            .ok_or(FontOpenError::MalformedTable(self.tag))?;
        font_data
            .get(self.offset()..end)
            .ok_or(FontOpenError::MalformedTable(self.tag))
    }
}

impl fmt::Debug for TableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table Entry")
            .field("tag", &self.tag())
            .field("checksum", &self.checksum())
            .field("offset", &self.offset())
            .field("length", &self.length())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(scaler_type: &[u8; 4], tags: &[&[u8; 4]]) -> Vec<u8> {
        let mut data = scaler_type.to_vec();
        data.extend_from_slice(&(tags.len() as u16).to_be_bytes());
        data.extend_from_slice(&[0; 6]);
        for (i, tag) in tags.iter().enumerate() {
            data.extend_from_slice(*tag);
            data.extend_from_slice(&0_u32.to_be_bytes());
            data.extend_from_slice(&(100 * i as u32).to_be_bytes());
            data.extend_from_slice(&4_u32.to_be_bytes());
        }
        data
    }

    #[test]
    fn find_tables_by_tag() {
        let data = directory(b"true", &[b"cmap", b"glyf", b"head"]);
        let offset_table = OffsetTable::new(&data).unwrap();

        assert_eq!(offset_table.get_table(Tag::GLYF).unwrap().offset(), 100);
        assert_eq!(offset_table.get_table(Tag::HEAD).unwrap().offset(), 200);
        assert!(offset_table.get_table(Tag::LOCA).is_none());
        assert!(matches!(
            offset_table.require_table(Tag::MAXP),
            Err(FontOpenError::MissingTable(Tag::MAXP))
        ));
    }

    #[test]
    fn unsorted_directory_is_tolerated() {
        let data = directory(&[0, 1, 0, 0], &[b"head", b"cmap"]);
        let offset_table = OffsetTable::new(&data).unwrap();
        assert_eq!(offset_table.get_table(Tag::HEAD).unwrap().offset(), 0);
        assert_eq!(offset_table.get_table(Tag::CMAP).unwrap().offset(), 100);
    }

    #[test]
    fn reject_unknown_signature() {
        let data = directory(b"wOFF", &[]);
        assert!(matches!(
            OffsetTable::new(&data),
            Err(FontOpenError::InvalidSignature(_))
        ));
        assert!(matches!(
            OffsetTable::new(&[0, 1]),
            Err(FontOpenError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn display_tag() {
        assert_eq!(Tag::CMAP.to_string(), "cmap");
    }
}
