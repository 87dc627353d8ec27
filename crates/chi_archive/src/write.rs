//! Types for writing DAT and TM3 archives
//!

use binrw::BinWrite;
use bon::Builder;
use chi_buffer::{BinaryCursor, SeekMode};
use std::fs::File;
use std::io::{self, Seek, Write};
use std::path::PathBuf;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::progress::{CancellationToken, Progress};
use crate::types::{ArchiveKind, DatTable, EntryTag, Tm3Table};

/// Options for how an archive should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct PackOptions {
    /// Words written into the unknown TM3 header field
    #[builder(default = [4, 0])]
    pub tm3_reserved: [u32; 2],

    /// Store empty DAT entries as null entries
    #[builder(default)]
    pub empty_as_null: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Where the data of an entry comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySource {
    /// Read from a file while encoding
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl From<PathBuf> for EntrySource {
    fn from(value: PathBuf) -> Self {
        EntrySource::Path(value)
    }
}

impl From<Vec<u8>> for EntrySource {
    fn from(value: Vec<u8>) -> Self {
        EntrySource::Bytes(value)
    }
}

impl From<&[u8]> for EntrySource {
    fn from(value: &[u8]) -> Self {
        EntrySource::Bytes(value.to_vec())
    }
}

impl EntrySource {
    /// Name reported to progress callbacks
    fn display_name(&self, tag: &EntryTag) -> String {
        match self {
            EntrySource::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            EntrySource::Bytes(_) => tag.printable(),
        }
    }

    fn write_to<W: Write>(&self, out: &mut W) -> Result<u64> {
        match self {
            EntrySource::Path(path) => Ok(io::copy(&mut File::open(path)?, out)?),
            EntrySource::Bytes(bytes) => {
                out.write_all(bytes)?;
                Ok(bytes.len() as u64)
            }
        }
    }
}

#[derive(Debug, Clone)]
enum PendingEntry {
    Null,
    Present { tag: EntryTag, source: EntrySource },
}

/// DAT and TM3 archive generator
///
/// Entries are collected first and written in one go by [`ArchiveBuilder::encode`], which is
/// the only place offsets are assigned.
///
/// ```
/// # fn doit() -> chi_archive::error::Result<()>
/// # {
/// use chi_archive::{ArchiveBuilder, ArchiveKind, EntryTag};
/// use chi_archive::write::PackOptions;
/// use chi_archive::progress::CancellationToken;
///
/// let mut dat = ArchiveBuilder::new(ArchiveKind::Dat);
/// dat.add_entry(EntryTag::type_from_str("TIM3")?, b"texture".as_slice())?
///     .add_null_entry()?;
///
/// // We use a buffer here, though you'd normally use a `File`
/// let mut out = std::io::Cursor::new(Vec::new());
/// let written = dat.encode(&mut out, &PackOptions::default(), (), &CancellationToken::new())?;
/// assert_eq!(written, 32 + 7);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    kind: ArchiveKind,
    entries: Vec<PendingEntry>,
}

impl ArchiveBuilder {
    pub fn new(kind: ArchiveKind) -> ArchiveBuilder {
        ArchiveBuilder {
            kind,
            entries: Vec::new(),
        }
    }

    pub const fn kind(&self) -> ArchiveKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry, the tag has to belong to the archive kind
    pub fn add_entry(
        &mut self,
        tag: EntryTag,
        source: impl Into<EntrySource>,
    ) -> Result<&mut Self> {
        if tag.kind() != self.kind {
            return Err(Error::InvalidTag(tag.to_latin1()));
        }

        self.entries.push(PendingEntry::Present {
            tag,
            source: source.into(),
        });
        Ok(self)
    }

    /// Appends an entry that takes a slot in the table but has no data
    pub fn add_null_entry(&mut self) -> Result<&mut Self> {
        if self.kind == ArchiveKind::Tm3 {
            return Err(Error::NullEntryNotSupported);
        }

        self.entries.push(PendingEntry::Null);
        Ok(self)
    }

    /// Writes the archive to `out` starting at its current position and returns the number of
    /// bytes written.
    ///
    /// The table region is zero filled first, entry data follows in order and the table is
    /// written last. Offsets are relative to the starting position. The token is checked after
    /// every entry, data written before a cancellation stays in `out`.
    #[instrument(skip_all, fields(kind = %self.kind, entries = self.entries.len()), err)]
    pub fn encode<W: Write + Seek, P: Progress>(
        self,
        out: &mut W,
        options: &PackOptions,
        mut progress: P,
        token: &CancellationToken,
    ) -> Result<u64> {
        let total = u32::try_from(self.entries.len()).map_err(|_| Error::ArchiveTooLarge)?;
        let mut cursor = BinaryCursor::new(out);
        let start = cursor.position()?;

        let header_size = self.kind.header_size(total);
        cursor.write_zeros(header_size as u64)?;
        debug!(header_size, "reserved entry table");

        let mut offsets = Vec::with_capacity(self.entries.len());
        let mut tags = Vec::with_capacity(self.entries.len());
        for (index, entry) in self.entries.iter().enumerate() {
            let (tag, source) = match entry {
                PendingEntry::Null => {
                    offsets.push(0);
                    tags.push(EntryTag::Type([0; 4]));
                    continue;
                }
                PendingEntry::Present { tag, source } => (tag, source),
            };

            let current = index as u32 + 1;
            let name = source.display_name(tag);
            progress.on_start(total, current, &name);

            let position = cursor.position()? - start;
            let offset = u32::try_from(position).map_err(|_| Error::ArchiveTooLarge)?;
            let size = source.write_to(&mut cursor)?;
            debug!(index, offset, size, "wrote entry");

            let is_null = options.empty_as_null && self.kind == ArchiveKind::Dat && size == 0;
            offsets.push(if is_null { 0 } else { offset });
            tags.push(*tag);

            progress.on_done(total, current, &name);
            token.check()?;
        }

        let end = cursor.position()?;
        if end - start > u32::MAX as u64 {
            return Err(Error::ArchiveTooLarge);
        }

        cursor.seek(start as i64, SeekMode::Start)?;
        match self.kind {
            ArchiveKind::Dat => DatTable {
                entry_count: total,
                offsets,
                types: tags
                    .iter()
                    .map(|tag| match tag {
                        EntryTag::Type(t) => *t,
                        EntryTag::Name(_) => [0; 4],
                    })
                    .collect(),
            }
            .write(&mut cursor)?,
            ArchiveKind::Tm3 => Tm3Table {
                entry_count: total,
                reserved: options.tm3_reserved,
                offsets,
                padding: vec![0; (total % 2) as usize],
                names: tags
                    .iter()
                    .map(|tag| match tag {
                        EntryTag::Name(n) => *n,
                        EntryTag::Type(_) => [0; 8],
                    })
                    .collect(),
            }
            .write(&mut cursor)?,
        }
        cursor.seek(end as i64, SeekMode::Start)?;

        Ok(end - start)
    }
}
