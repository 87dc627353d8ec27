//! This library handles reading from and creating the **DAT** and **TM3** archives used by PS2
//! games.
//!
//! # DAT / TM3 Archive Format Documentation
//!
//! Both formats are a table of offsets followed by the entry data. Sizes are not stored, the
//! size of an entry runs up to the next entry with data or to the end of the archive. Archives
//! can be nested, an entry of one archive is often an archive itself, so all offsets are
//! relative to the start of the table. All values are little-endian.
//!
//! ## DAT
//!
//! | Offset (bytes) | Field       | Description                                              |
//! |----------------|-------------|----------------------------------------------------------|
//! | 0x0000         | Entry Count | 4 bytes: Number of entries, null entries included        |
//! | 0x0004         | Offsets     | 4 bytes per entry: 0 marks a null entry without data     |
//! | ...            | Types       | 4 bytes per entry: Type code such as `"TIM3"`            |
//!
//! Entry data starts after the table, which is zero padded to a multiple of 32 bytes with room
//! for at least one spare word.
//!
//! ## TM3
//!
//! | Offset (bytes) | Field       | Description                                              |
//! |----------------|-------------|----------------------------------------------------------|
//! | 0x0000         | Magic       | 4 bytes: `"TM3\0"`                                       |
//! | 0x0004         | Entry Count | 4 bytes: Number of entries                               |
//! | 0x0008         | Reserved    | 8 bytes: Unknown, usually `4` and `0`                    |
//! | 0x0010         | Offsets     | 4 bytes per entry, plus 4 zero bytes for an odd count    |
//! | ...            | Names       | 8 bytes per entry: NUL padded name                       |
//!
//! TM3 archives hold textures and have no null entries. The table is zero padded to at least
//! 128 bytes and otherwise to a multiple of 64.
//!
//! ## Unpacking
//!
//! [`unpack::unpack_archive`] writes each entry to its own file and lists them in a
//! [`manifest::Manifest`], which [`manifest::pack_manifest`] turns back into an archive:
//!
//! ```
//! # fn doit() -> chi_archive::error::Result<()> {
//! use chi_archive::progress::CancellationToken;
//! use chi_archive::write::PackOptions;
//! use chi_archive::{Archive, ArchiveBuilder, ArchiveKind, EntryTag};
//! use std::io::Cursor;
//!
//! let mut tm3 = ArchiveBuilder::new(ArchiveKind::Tm3);
//! tm3.add_entry(EntryTag::name_from_str("face")?, vec![0xAA; 16])?;
//!
//! let mut out = Cursor::new(Vec::new());
//! tm3.encode(&mut out, &PackOptions::default(), (), &CancellationToken::new())?;
//!
//! let archive = Archive::decode(&mut out, ArchiveKind::Tm3, 0, 0)?;
//! assert_eq!(archive.read_entry(&mut out, 0)?, vec![0xAA; 16]);
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```

pub mod error;
pub mod manifest;
pub mod progress;
pub mod read;
pub mod types;
pub mod unpack;
pub mod write;

pub use progress::{CancellationToken, JobState, Progress};
pub use read::Archive;
pub use types::{ArchiveKind, Entry, EntryTag};
pub use write::ArchiveBuilder;
