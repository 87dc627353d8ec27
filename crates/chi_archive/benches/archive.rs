use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

fn build(entries: usize) -> chi_archive::ArchiveBuilder {
    let mut dat = chi_archive::ArchiveBuilder::new(chi_archive::ArchiveKind::Dat);
    for i in 0..entries {
        if i % 7 == 3 {
            dat.add_null_entry().unwrap();
        } else {
            dat.add_entry(chi_archive::EntryTag::Type(*b"TIM3"), vec![i as u8; 4096])
                .unwrap();
        }
    }
    dat
}

pub mod write {
    use chi_archive::write::PackOptions;
    use chi_archive::CancellationToken;
    use divan::Bencher;
    use std::io::Cursor;

    #[divan::bench(args = [16, 256, 1024])]
    fn encode(bencher: Bencher, entries: usize) {
        bencher
            .with_inputs(|| super::build(entries))
            .bench_values(|dat| {
                let mut out = Cursor::new(Vec::new());
                dat.encode(
                    &mut out,
                    &PackOptions::default(),
                    (),
                    &CancellationToken::new(),
                )
                .unwrap();
                divan::black_box(out);
            });
    }
}

pub mod read {
    use chi_archive::write::PackOptions;
    use chi_archive::{Archive, ArchiveKind, CancellationToken};
    use divan::Bencher;
    use std::io::Cursor;

    fn get_input(entries: usize) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        super::build(entries)
            .encode(
                &mut out,
                &PackOptions::default(),
                (),
                &CancellationToken::new(),
            )
            .unwrap();
        out.into_inner()
    }

    #[divan::bench(args = [16, 256, 1024])]
    fn decode(bencher: Bencher, entries: usize) {
        bencher
            .with_inputs(|| get_input(entries))
            .bench_refs(|data| {
                divan::black_box(
                    Archive::decode(&mut Cursor::new(data), ArchiveKind::Dat, 0, 0).unwrap(),
                );
            });
    }

    #[divan::bench(sample_count = 10)]
    fn read_all(bencher: Bencher) {
        let data = get_input(256);
        let archive = Archive::decode(&mut Cursor::new(&data), ArchiveKind::Dat, 0, 0).unwrap();
        bencher.bench_local(|| {
            let mut stream = Cursor::new(&data);
            for (index, ..) in archive.present() {
                divan::black_box(archive.read_entry(&mut stream, index).unwrap());
            }
        });
    }
}
