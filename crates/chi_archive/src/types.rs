//! Base types for structure of DAT and TM3 archives.

use binrw::{BinRead, BinWrite};
use std::fmt;

use crate::error::{Error, Result};

/// Length of a DAT entry type
pub const TYPE_LENGTH: usize = 4;

/// Length of a TM3 entry name
pub const NAME_LENGTH: usize = 8;

/// `"TM3\0"` as a little endian integer
pub const TM3_SIGNATURE: u32 = 0x00334D54;

/// DAT entry table
///
/// Offsets are relative to the start of the table, an offset of 0 marks a null entry.
#[derive(BinRead, BinWrite, Debug, Default, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct DatTable {
    /// The number of entries in the archive, null entries included
    pub entry_count: u32,

    /// Offset of each entry from the start of the table
    #[br(count = entry_count)]
    pub offsets: Vec<u32>,

    /// Four byte type code of each entry, usually the file extension in upper case
    #[br(count = entry_count)]
    pub types: Vec<[u8; TYPE_LENGTH]>,
}

/// TM3 entry table
///
/// Always starts with "TM3\0". The offset list is padded to an even number of words.
#[derive(BinRead, BinWrite, Debug, Default, Clone, PartialEq, Eq)]
#[brw(little, magic = b"TM3\0")]
pub struct Tm3Table {
    /// The number of entries in the archive
    pub entry_count: u32,

    /// Unknown, archives from the game carry `4, 0`
    pub reserved: [u32; 2],

    /// Offset of each entry from the start of the table
    #[br(count = entry_count)]
    pub offsets: Vec<u32>,

    #[br(count = entry_count % 2)]
    pub padding: Vec<u32>,

    /// NUL padded name of each entry
    #[br(count = entry_count)]
    pub names: Vec<[u8; NAME_LENGTH]>,
}

/// Archive flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// Entries are tagged with a 4 byte type and can be null
    Dat,
    /// Entries are tagged with an 8 byte name
    Tm3,
}

impl ArchiveKind {
    /// Size of the zero filled region reserved for the entry table when packing
    ///
    /// ```
    /// use chi_archive::ArchiveKind;
    ///
    /// assert_eq!(ArchiveKind::Dat.header_size(2), 32);
    /// assert_eq!(ArchiveKind::Dat.header_size(4), 64);
    /// assert_eq!(ArchiveKind::Tm3.header_size(3), 128);
    /// assert_eq!(ArchiveKind::Tm3.header_size(10), 192);
    /// ```
    pub const fn header_size(self, entry_count: u32) -> u32 {
        match self {
            ArchiveKind::Dat => (entry_count * 2 + 1).div_ceil(8) * 8 * 4,
            ArchiveKind::Tm3 => {
                let even = entry_count + (entry_count & 1);
                let size = 16 + even * 4 + even * NAME_LENGTH as u32;
                if size < 128 {
                    128
                } else {
                    size.div_ceil(64) * 64
                }
            }
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveKind::Dat => write!(f, "dat"),
            ArchiveKind::Tm3 => write!(f, "tm3"),
        }
    }
}

/// Identifies an entry, a type code in DAT archives and a name in TM3 archives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryTag {
    Type([u8; TYPE_LENGTH]),
    Name([u8; NAME_LENGTH]),
}

impl EntryTag {
    /// Builds a DAT type from a string holding one character per byte
    pub fn type_from_str(value: &str) -> Result<EntryTag> {
        let bytes = latin1_bytes(value)?;
        let tag = bytes
            .try_into()
            .map_err(|_| Error::InvalidTag(value.to_owned()))?;
        Ok(EntryTag::Type(tag))
    }

    /// Builds a TM3 name from a string holding one character per byte.
    ///
    /// Longer names are cut to 8 bytes and shorter ones are padded with NUL.
    pub fn name_from_str(value: &str) -> Result<EntryTag> {
        let bytes = latin1_bytes(value)?;
        let mut name = [0u8; NAME_LENGTH];
        let len = bytes.len().min(NAME_LENGTH);
        name[..len].copy_from_slice(&bytes[..len]);
        Ok(EntryTag::Name(name))
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            EntryTag::Type(t) => t,
            EntryTag::Name(n) => n,
        }
    }

    pub const fn kind(&self) -> ArchiveKind {
        match self {
            EntryTag::Type(_) => ArchiveKind::Dat,
            EntryTag::Name(_) => ArchiveKind::Tm3,
        }
    }

    /// Every byte as the character with the same code point, so the tag survives a trip through
    /// JSON unchanged
    pub fn to_latin1(&self) -> String {
        self.as_bytes().iter().map(|&b| b as char).collect()
    }

    /// The tag reduced to ASCII letters, digits and `_-. `, safe to use in file names
    ///
    /// ```
    /// use chi_archive::EntryTag;
    ///
    /// assert_eq!(EntryTag::Type(*b"TIM3").printable(), "TIM3");
    /// assert_eq!(EntryTag::Name(*b"ab\x01/c\0\0\0").printable(), "abc");
    /// ```
    pub fn printable(&self) -> String {
        self.as_bytes()
            .iter()
            .filter(|&&b| b.is_ascii_alphanumeric() || b"_-. ".contains(&b))
            .map(|&b| b as char)
            .collect()
    }
}

impl fmt::Display for EntryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.printable())
    }
}

fn latin1_bytes(value: &str) -> Result<Vec<u8>> {
    value
        .chars()
        .map(|c| u8::try_from(c).map_err(|_| Error::InvalidTag(value.to_owned())))
        .collect()
}

/// An entry of a decoded archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// Occupies a slot in the table but has no data
    Null,
    Present {
        tag: EntryTag,
        /// Absolute offset in the stream the archive was decoded from
        offset: u32,
        /// Inferred from the offset of the next entry
        size: u32,
    },
}

impl Entry {
    pub const fn is_null(&self) -> bool {
        matches!(self, Entry::Null)
    }

    pub const fn tag(&self) -> Option<&EntryTag> {
        match self {
            Entry::Null => None,
            Entry::Present { tag, .. } => Some(tag),
        }
    }

    pub const fn size(&self) -> u32 {
        match self {
            Entry::Null => 0,
            Entry::Present { size, .. } => *size,
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::{BinRead, BinWrite};
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::types::{ArchiveKind, DatTable, EntryTag, Tm3Table};

    #[test]
    fn read_dat_table() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x02, 0x00, 0x00, 0x00,
            0x20, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x54, 0x49, 0x4D, 0x33,
            0x00, 0x00, 0x00, 0x00,
        ]);

        let expected = DatTable {
            entry_count: 2,
            offsets: vec![0x20, 0],
            types: vec![*b"TIM3", [0; 4]],
        };

        assert_eq!(DatTable::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn write_tm3_table_with_odd_count() -> Result<()> {
        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x54, 0x4D, 0x33, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x80, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x66, 0x61, 0x63, 0x65, 0x00, 0x00, 0x00, 0x00,
        ];

        let table = Tm3Table {
            entry_count: 1,
            reserved: [4, 0],
            offsets: vec![0x80],
            padding: vec![0],
            names: vec![*b"face\0\0\0\0"],
        };

        let mut actual = Vec::new();
        table.write(&mut Cursor::new(&mut actual))?;
        assert_eq!(actual, expected);

        assert_eq!(Tm3Table::read(&mut Cursor::new(actual))?, table);

        Ok(())
    }

    #[test]
    fn read_tm3_table_bad_magic() {
        let mut input = Cursor::new(b"TIM2\x01\0\0\0\0\0\0\0\0\0\0\0".to_vec());
        assert!(Tm3Table::read(&mut input).is_err());
    }

    #[test]
    fn header_sizes() {
        assert_eq!(ArchiveKind::Dat.header_size(0), 32);
        assert_eq!(ArchiveKind::Dat.header_size(3), 32);
        assert_eq!(ArchiveKind::Dat.header_size(4), 64);
        assert_eq!(ArchiveKind::Dat.header_size(0x26A), 4960);

        assert_eq!(ArchiveKind::Tm3.header_size(1), 128);
        assert_eq!(ArchiveKind::Tm3.header_size(8), 128);
        assert_eq!(ArchiveKind::Tm3.header_size(9), 192);
        assert_eq!(ArchiveKind::Tm3.header_size(10), 192);
        assert_eq!(ArchiveKind::Tm3.header_size(11), 192);
    }

    #[test]
    fn tags_from_strings() -> Result<()> {
        assert_eq!(EntryTag::type_from_str("TIM3")?, EntryTag::Type(*b"TIM3"));
        assert_eq!(
            EntryTag::type_from_str("\u{0}\u{0}\u{0}\u{0}")?,
            EntryTag::Type([0; 4])
        );
        assert_eq!(
            EntryTag::name_from_str("face")?,
            EntryTag::Name(*b"face\0\0\0\0")
        );
        assert_eq!(
            EntryTag::name_from_str("background")?,
            EntryTag::Name(*b"backgrou")
        );
        assert_eq!(
            EntryTag::type_from_str("\u{ff}ab\u{80}")?,
            EntryTag::Type([0xFF, b'a', b'b', 0x80])
        );

        assert!(matches!(
            EntryTag::type_from_str("TIM"),
            Err(Error::InvalidTag(_))
        ));
        assert!(matches!(
            EntryTag::name_from_str("\u{100}"),
            Err(Error::InvalidTag(_))
        ));

        Ok(())
    }

    #[test]
    fn latin1_round_trip() -> Result<()> {
        let tag = EntryTag::Name([0x00, 0x7F, 0x80, 0xFF, b'a', b'"', b'\\', 0x01]);
        assert_eq!(EntryTag::name_from_str(&tag.to_latin1())?, tag);
        Ok(())
    }
}
