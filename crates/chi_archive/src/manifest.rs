//! The `METADATA.json` manifest written next to unpacked entries.
//!
//! A manifest lists every entry in table order with the file its data lives in, relative to the
//! manifest. Editing the files and packing the manifest rebuilds the archive. Tags are stored
//! with one character per byte so unprintable bytes survive.
//!
//! ```json
//! {
//! 	"entry_total": 2,
//! 	"entries": [
//! 		{
//! 			"is_null": false,
//! 			"source": "FILES/TIM3/TIM3_000.tim3",
//! 			"type": "TIM3"
//! 		},
//! 		{
//! 			"is_null": true,
//! 			"source": "",
//! 			"type": "\u0000\u0000\u0000\u0000"
//! 		}
//! 	]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::error::{Error, Result};
use crate::progress::{CancellationToken, Progress};
use crate::read::Archive;
use crate::types::{ArchiveKind, Entry, EntryTag};
use crate::unpack::entry_path;
use crate::write::{ArchiveBuilder, PackOptions};

pub const MANIFEST_FILE_NAME: &str = "METADATA.json";

/// Directory next to the manifest that holds the entry files
pub const FILES_DIR: &str = "FILES";

/// File name used by [`pack_manifest`] when no output is given
pub const DEFAULT_OUTPUT: &str = "OUTPUT.dat";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DatManifest {
    pub entry_total: u32,
    pub entries: Vec<DatManifestEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DatManifestEntry {
    pub is_null: bool,
    /// Empty for null entries
    pub source: String,
    #[serde(rename = "type")]
    pub entry_type: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tm3Manifest {
    pub entry_total: u32,
    pub entries: Vec<Tm3ManifestEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tm3ManifestEntry {
    pub source: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Manifest {
    Dat(DatManifest),
    Tm3(Tm3Manifest),
}

impl Manifest {
    pub const fn kind(&self) -> ArchiveKind {
        match self {
            Manifest::Dat(_) => ArchiveKind::Dat,
            Manifest::Tm3(_) => ArchiveKind::Tm3,
        }
    }

    /// Describes the files [`crate::unpack::unpack`] writes for `archive` into [`FILES_DIR`]
    pub fn from_archive(archive: &Archive) -> Manifest {
        let entry_total = archive.len() as u32;
        let source = |tag: &EntryTag, index: usize| format!("{FILES_DIR}/{}", entry_path(tag, index));

        match archive.kind {
            ArchiveKind::Dat => Manifest::Dat(DatManifest {
                entry_total,
                entries: archive
                    .entries
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| match entry {
                        Entry::Null => DatManifestEntry {
                            is_null: true,
                            source: String::new(),
                            entry_type: EntryTag::Type([0; 4]).to_latin1(),
                        },
                        Entry::Present { tag, .. } => DatManifestEntry {
                            is_null: false,
                            source: source(tag, index),
                            entry_type: tag.to_latin1(),
                        },
                    })
                    .collect(),
            }),
            ArchiveKind::Tm3 => Manifest::Tm3(Tm3Manifest {
                entry_total,
                entries: archive
                    .present()
                    .map(|(index, tag, ..)| Tm3ManifestEntry {
                        source: source(tag, index),
                        name: tag.to_latin1(),
                    })
                    .collect(),
            }),
        }
    }

    pub fn from_reader<R: Read>(reader: R, kind: ArchiveKind) -> Result<Manifest> {
        let manifest = match kind {
            ArchiveKind::Dat => Manifest::Dat(serde_json::from_reader(reader)?),
            ArchiveKind::Tm3 => Manifest::Tm3(serde_json::from_reader(reader)?),
        };
        manifest.validate()?;
        Ok(manifest)
    }

    #[instrument(err)]
    pub fn load(path: &Path, kind: ArchiveKind) -> Result<Manifest> {
        Manifest::from_reader(BufReader::new(File::open(path)?), kind)
    }

    /// Writes the manifest as tab indented JSON
    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
        match self {
            Manifest::Dat(manifest) => manifest.serialize(&mut serializer)?,
            Manifest::Tm3(manifest) => manifest.serialize(&mut serializer)?,
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        match self {
            Manifest::Dat(manifest) => manifest.entries.len(),
            Manifest::Tm3(manifest) => manifest.entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that `entry_total` agrees with the entry list
    pub fn validate(&self) -> Result<()> {
        let entry_total = match self {
            Manifest::Dat(manifest) => manifest.entry_total,
            Manifest::Tm3(manifest) => manifest.entry_total,
        };
        if entry_total as usize != self.len() {
            return Err(Error::InvalidManifest(format!(
                "entry_total is {entry_total} but {} entries are listed",
                self.len()
            )));
        }
        Ok(())
    }

    /// Collects the entries into a builder, resolving sources against `base_dir`
    pub fn to_builder(&self, base_dir: &Path) -> Result<ArchiveBuilder> {
        self.validate()?;

        let resolve = |index: usize, source: &str| {
            if source.is_empty() {
                return Err(Error::InvalidManifest(format!("entry {index} has no source")));
            }
            Ok(base_dir.join(source))
        };

        let mut builder = ArchiveBuilder::new(self.kind());
        match self {
            Manifest::Dat(manifest) => {
                for (index, entry) in manifest.entries.iter().enumerate() {
                    if entry.is_null {
                        builder.add_null_entry()?;
                    } else {
                        builder.add_entry(
                            EntryTag::type_from_str(&entry.entry_type)?,
                            resolve(index, &entry.source)?,
                        )?;
                    }
                }
            }
            Manifest::Tm3(manifest) => {
                for (index, entry) in manifest.entries.iter().enumerate() {
                    builder.add_entry(
                        EntryTag::name_from_str(&entry.name)?,
                        resolve(index, &entry.source)?,
                    )?;
                }
            }
        }
        Ok(builder)
    }
}

/// Rebuilds an archive from a manifest.
///
/// The archive is written to `output`, or [`DEFAULT_OUTPUT`] next to the manifest, and its path
/// is returned.
#[instrument(skip(options, progress, token), err)]
pub fn pack_manifest<P: Progress>(
    manifest_path: &Path,
    kind: ArchiveKind,
    output: Option<&Path>,
    options: &PackOptions,
    progress: P,
    token: &CancellationToken,
) -> Result<PathBuf> {
    let manifest = Manifest::load(manifest_path, kind)?;
    let base_dir = manifest_path.parent().unwrap_or(Path::new(""));
    let builder = manifest.to_builder(base_dir)?;

    let output = match output {
        Some(output) => output.to_path_buf(),
        None => base_dir.join(DEFAULT_OUTPUT),
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = BufWriter::new(File::create(&output)?);
    let written = builder.encode(&mut file, options, progress, token)?;
    file.flush()?;
    info!("packed {} entries, {written} bytes", manifest.len());

    Ok(output)
}
