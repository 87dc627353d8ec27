//! Types for reading DAT and TM3 archives
//!

use binrw::BinRead;
use chi_buffer::{BinaryCursor, SeekMode};
use std::io::{self, Read, Seek, SeekFrom};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::types::{ArchiveKind, DatTable, Entry, EntryTag, Tm3Table};

/// A decoded DAT or TM3 entry table
///
/// Decoding reads the table only. Entry data stays in the stream and is read on demand with
/// [`Archive::read_entry`] or [`Archive::entry_reader`].
///
/// ```no_run
/// use std::fs::File;
/// use chi_archive::{Archive, ArchiveKind, Entry};
///
/// fn list_dat_contents(path: &str) -> chi_archive::error::Result<()> {
///     let mut file = File::open(path)?;
///     let dat = Archive::decode(&mut file, ArchiveKind::Dat, 0, 0)?;
///
///     for (i, entry) in dat.entries.iter().enumerate() {
///         match entry {
///             Entry::Null => println!("{i:>4}: null"),
///             Entry::Present { tag, offset, size } => {
///                 println!("{i:>4}: {tag} at {offset:#X}, {size} bytes")
///             }
///         }
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub kind: ArchiveKind,
    /// Where the entry table starts in the stream
    pub base_offset: u32,
    /// Number of bytes from `base_offset` that belong to the archive
    pub region_size: u32,
    pub entries: Vec<Entry>,
}

impl Archive {
    /// Reads the entry table of an archive located `base_offset` bytes into `stream`.
    ///
    /// A `region_size` of 0 means the archive runs to the end of the stream. Entry sizes are
    /// inferred from the offset of the next non-null entry, the last one running to the end of
    /// the region.
    #[instrument(skip(stream), err)]
    pub fn decode<S: Read + Seek>(
        stream: &mut S,
        kind: ArchiveKind,
        base_offset: u32,
        region_size: u32,
    ) -> Result<Archive> {
        let mut cursor = BinaryCursor::new(stream);

        let region_size = match region_size {
            0 => {
                let remaining = cursor.stream_len()?.saturating_sub(base_offset as u64);
                u32::try_from(remaining).map_err(|_| Error::ArchiveTooLarge)?
            }
            size => size,
        };
        let region_end = base_offset
            .checked_add(region_size)
            .ok_or(Error::ArchiveTooLarge)?;

        cursor.seek(base_offset as i64, SeekMode::Start)?;
        let table: Vec<(u32, EntryTag)> = match kind {
            ArchiveKind::Dat => {
                let table = DatTable::read(&mut cursor)?;
                table
                    .offsets
                    .into_iter()
                    .zip(table.types.into_iter().map(EntryTag::Type))
                    .collect()
            }
            ArchiveKind::Tm3 => {
                let table = Tm3Table::read(&mut cursor).map_err(|e| match e {
                    binrw::Error::BadMagic { pos, .. } => Error::SignatureMismatch { pos },
                    e => e.into(),
                })?;
                table
                    .offsets
                    .into_iter()
                    .zip(table.names.into_iter().map(EntryTag::Name))
                    .collect()
            }
        };
        debug!(entries = table.len(), region_size, "read entry table");

        let mut entries = Vec::with_capacity(table.len());
        let mut next = region_end;
        for (index, (relative, tag)) in table.into_iter().enumerate().rev() {
            if kind == ArchiveKind::Dat && relative == 0 {
                entries.push(Entry::Null);
                continue;
            }

            let offset = base_offset
                .checked_add(relative)
                .filter(|offset| *offset <= next)
                .ok_or(Error::InvalidOffset {
                    index,
                    offset: relative,
                })?;

            entries.push(Entry::Present {
                tag,
                offset,
                size: next - offset,
            });
            next = offset;
        }
        entries.reverse();

        Ok(Archive {
            kind,
            base_offset,
            region_size,
            entries,
        })
    }

    /// Number of entries in the table, null entries included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absolute offset of the first byte past the archive
    pub fn region_end(&self) -> u64 {
        self.base_offset as u64 + self.region_size as u64
    }

    pub fn entry(&self, index: usize) -> Result<&Entry> {
        self.entries.get(index).ok_or(Error::EntryNotFound(index))
    }

    /// Iterates over the non-null entries as `(index, tag, offset, size)`
    pub fn present(&self) -> impl Iterator<Item = (usize, &EntryTag, u32, u32)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                Entry::Null => None,
                Entry::Present { tag, offset, size } => Some((index, tag, *offset, *size)),
            })
    }

    fn locate(&self, index: usize) -> Result<(u32, u32)> {
        match self.entry(index)? {
            Entry::Null => Err(Error::NullEntry(index)),
            Entry::Present { offset, size, .. } => Ok((*offset, *size)),
        }
    }

    /// Reader over the data of a single entry, bounded to its size
    pub fn entry_reader<'a, S: Read + Seek>(
        &self,
        stream: &'a mut S,
        index: usize,
    ) -> Result<io::Take<&'a mut S>> {
        let (offset, size) = self.locate(index)?;
        stream.seek(SeekFrom::Start(offset as u64))?;
        Ok(Read::take(stream, size as u64))
    }

    /// Reads the whole data of a single entry
    #[instrument(skip(self, stream), err)]
    pub fn read_entry<S: Read + Seek>(&self, stream: &mut S, index: usize) -> Result<Vec<u8>> {
        let (offset, size) = self.locate(index)?;
        let mut cursor = BinaryCursor::new(stream);
        cursor.seek(offset as i64, SeekMode::Start)?;
        Ok(cursor.read_bytes(size as usize)?)
    }

    /// Decodes an entry that is itself an archive, in place
    pub fn decode_entry<S: Read + Seek>(
        &self,
        stream: &mut S,
        index: usize,
        kind: ArchiveKind,
    ) -> Result<Archive> {
        let (offset, size) = self.locate(index)?;
        if size == 0 {
            return Err(Error::InvalidOffset { index, offset });
        }
        Archive::decode(stream, kind, offset, size)
    }
}
