use chi_archive::error::{Error, Result};
use chi_archive::manifest::{pack_manifest, Manifest, Tm3ManifestEntry};
use chi_archive::unpack::unpack_archive;
use chi_archive::write::PackOptions;
use chi_archive::{Archive, ArchiveBuilder, ArchiveKind, CancellationToken, Entry, EntryTag};
use std::fs::{self, File};
use std::io::Cursor;
use tracing::info;
use tracing_test::traced_test;

fn tm3_bytes(entries: &[(&str, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut builder = ArchiveBuilder::new(ArchiveKind::Tm3);
    for (name, data) in entries {
        builder.add_entry(EntryTag::name_from_str(name)?, data.clone())?;
    }

    let mut out = Cursor::new(Vec::new());
    builder.encode(
        &mut out,
        &PackOptions::default(),
        (),
        &CancellationToken::new(),
    )?;
    Ok(out.into_inner())
}

#[traced_test]
#[test]
fn unpack_and_pack_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("face.tm3");
    fs::write(
        &source,
        tm3_bytes(&[
            ("face", vec![1; 48]),
            ("eyes", vec![2; 16]),
            ("mouth", vec![3; 24]),
        ])?,
    )?;

    let manifest_path = unpack_archive(&source, ArchiveKind::Tm3, (), &CancellationToken::new())?;
    let files = manifest_path.with_file_name("FILES");
    assert_eq!(fs::read(files.join("face_000.tm3"))?, vec![1; 48]);
    assert_eq!(fs::read(files.join("eyes_001.tm3"))?, vec![2; 16]);
    assert_eq!(fs::read(files.join("mouth_002.tm3"))?, vec![3; 24]);

    let Manifest::Tm3(manifest) = Manifest::load(&manifest_path, ArchiveKind::Tm3)? else {
        panic!("expected a TM3 manifest");
    };
    assert_eq!(
        manifest.entries[2],
        Tm3ManifestEntry {
            source: "FILES/mouth_002.tm3".into(),
            name: "mouth\0\0\0".into(),
        }
    );

    let output = pack_manifest(
        &manifest_path,
        ArchiveKind::Tm3,
        None,
        &PackOptions::default(),
        (),
        &CancellationToken::new(),
    )?;
    info!("packed {}", output.display());
    assert_eq!(fs::read(output)?, fs::read(source)?);

    Ok(())
}

#[traced_test]
#[test]
fn manifest_names_are_normalized() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("a.bin"), [1, 2, 3])?;
    fs::write(dir.path().join("b.bin"), [4, 5])?;
    fs::write(
        dir.path().join("METADATA.json"),
        r#"{
	"entry_total": 2,
	"entries": [
		{ "source": "a.bin", "name": "background_far" },
		{ "source": "b.bin", "name": "sky" }
	]
}"#,
    )?;

    let output = pack_manifest(
        &dir.path().join("METADATA.json"),
        ArchiveKind::Tm3,
        None,
        &PackOptions::default(),
        (),
        &CancellationToken::new(),
    )?;

    let mut stream = File::open(output)?;
    let archive = Archive::decode(&mut stream, ArchiveKind::Tm3, 0, 0)?;
    assert_eq!(
        archive.entries,
        vec![
            Entry::Present {
                tag: EntryTag::Name(*b"backgrou"),
                offset: 128,
                size: 3
            },
            Entry::Present {
                tag: EntryTag::Name(*b"sky\0\0\0\0\0"),
                offset: 131,
                size: 2
            },
        ]
    );

    Ok(())
}

#[test]
fn nested_tm3_inside_dat() -> Result<()> {
    let inner = tm3_bytes(&[("face", vec![7; 10]), ("body", vec![8; 6])])?;

    let mut dat = ArchiveBuilder::new(ArchiveKind::Dat);
    dat.add_entry(EntryTag::Type(*b"SCP\0"), vec![0; 20])?
        .add_null_entry()?
        .add_entry(EntryTag::Type(*b"TM3\0"), inner)?;

    let mut stream = Cursor::new(Vec::new());
    dat.encode(
        &mut stream,
        &PackOptions::default(),
        (),
        &CancellationToken::new(),
    )?;

    let outer = Archive::decode(&mut stream, ArchiveKind::Dat, 0, 0)?;
    let nested = outer.decode_entry(&mut stream, 2, ArchiveKind::Tm3)?;
    assert_eq!(nested.base_offset, 32 + 20);
    assert_eq!(nested.len(), 2);
    assert_eq!(nested.read_entry(&mut stream, 1)?, vec![8; 6]);

    assert!(matches!(
        outer.decode_entry(&mut stream, 0, ArchiveKind::Tm3),
        Err(Error::SignatureMismatch { pos: 32 })
    ));

    Ok(())
}
