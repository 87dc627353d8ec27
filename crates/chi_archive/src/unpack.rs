//! Extracting archive entries to files

use chi_buffer::{BinaryCursor, SeekMode};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::manifest::{Manifest, FILES_DIR, MANIFEST_FILE_NAME};
use crate::progress::{CancellationToken, Progress};
use crate::read::Archive;
use crate::types::{ArchiveKind, EntryTag};

/// Path, relative to the unpack directory and separated by `/`, an entry is extracted to.
///
/// DAT entries are grouped in a directory per type and get the lower cased type as extension,
/// TM3 entries all land in one directory.
///
/// ```
/// use chi_archive::EntryTag;
/// use chi_archive::unpack::entry_path;
///
/// assert_eq!(entry_path(&EntryTag::Type(*b"TIM3"), 0), "TIM3/TIM3_000.tim3");
/// assert_eq!(entry_path(&EntryTag::Type(*b"SCP\0"), 12), "SCP/SCP_012.scp");
/// assert_eq!(entry_path(&EntryTag::Name(*b"face\0\0\0\0"), 3), "face_003.tm3");
/// ```
pub fn entry_path(tag: &EntryTag, index: usize) -> String {
    let mut name = tag.printable();
    // `.` and `..` would resolve outside the type directory
    if !name.is_empty() && name.bytes().all(|b| b == b'.') {
        name = "_".into();
    }
    match tag {
        EntryTag::Type(_) if name.is_empty() => format!("_{index:03}"),
        EntryTag::Type(_) => format!("{name}/{name}_{index:03}.{}", name.to_lowercase()),
        EntryTag::Name(_) => format!("{name}_{index:03}.tm3"),
    }
}

/// Extracts every non-null entry of `archive` from `stream` into `dir`.
///
/// Progress is reported with the entry file name. The token is checked after every entry, files
/// written before a cancellation stay on disk.
#[instrument(skip(archive, stream, progress, token), fields(kind = %archive.kind, entries = archive.len()), err)]
pub fn unpack<S: Read + Seek, P: Progress>(
    archive: &Archive,
    stream: &mut S,
    dir: &Path,
    mut progress: P,
    token: &CancellationToken,
) -> Result<()> {
    let total = archive.len() as u32;
    let mut cursor = BinaryCursor::new(stream);

    for (index, tag, offset, size) in archive.present() {
        let relative = entry_path(tag, index);
        let target = relative.split('/').fold(dir.to_path_buf(), |p, c| p.join(c));
        let name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let current = index as u32 + 1;
        progress.on_start(total, current, &name);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = BufWriter::new(File::create(&target)?);
        cursor.seek(offset as i64, SeekMode::Start)?;
        cursor.copy_to(size as u64, &mut file)?;
        file.flush()?;
        debug!(index, offset, size, "extracted {relative}");

        progress.on_done(total, current, &name);
        token.check()?;
    }

    Ok(())
}

/// Directory an archive is unpacked to, `UNPACK_<file name>` next to the archive
pub fn unpack_dir(archive_path: &Path) -> PathBuf {
    let file_name = archive_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    archive_path
        .parent()
        .unwrap_or(Path::new(""))
        .join(format!("UNPACK_{file_name}"))
}

/// Unpacks the archive at `archive_path` and writes its manifest.
///
/// Entries go to `FILES` inside [`unpack_dir`] and the manifest is written once every entry is
/// out. Returns the path of the manifest.
#[instrument(skip(progress, token), err)]
pub fn unpack_archive<P: Progress>(
    archive_path: &Path,
    kind: ArchiveKind,
    progress: P,
    token: &CancellationToken,
) -> Result<PathBuf> {
    let mut file = File::open(archive_path)?;
    let archive = Archive::decode(&mut file, kind, 0, 0)?;

    let out_dir = unpack_dir(archive_path);
    let files_dir = out_dir.join(FILES_DIR);
    fs::create_dir_all(&files_dir)?;

    unpack(&archive, &mut file, &files_dir, progress, token)?;

    let manifest_path = out_dir.join(MANIFEST_FILE_NAME);
    Manifest::from_archive(&archive).save(&manifest_path)?;
    info!(
        "unpacked {} of {} entries to {}",
        archive.present().count(),
        archive.len(),
        out_dir.display()
    );

    Ok(manifest_path)
}
