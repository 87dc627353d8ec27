use chi_archive::manifest::pack_manifest;
use chi_archive::write::PackOptions;
use chi_archive::{ArchiveKind, CancellationToken};
use clap::Args;
use miette::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use super::{run_worker, LogProgress};

#[derive(Args)]
pub struct PackArgs {
    /// A METADATA.json written by unpack
    #[arg(short, long, value_name = "FILE")]
    manifest: PathBuf,

    /// The archive to write, OUTPUT.dat next to the manifest by default
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Store empty DAT entries as null entries
    #[arg(long, default_value_t = false)]
    empty_as_null: bool,
}

impl PackArgs {
    pub fn handle(&self, kind: ArchiveKind, token: &CancellationToken) -> Result<()> {
        let manifest = self.manifest.clone();
        let output = self.output.clone();
        let options = PackOptions::builder()
            .empty_as_null(self.empty_as_null)
            .build();

        let archive = run_worker(token, move |token| {
            pack_manifest(
                &manifest,
                kind,
                output.as_deref(),
                &options,
                LogProgress,
                token,
            )
        })
        .context(format!("packing {}", self.manifest.display()))?;

        info!("wrote {}", archive.display());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use chi_archive::unpack::unpack_archive;
    use chi_archive::{ArchiveKind, CancellationToken};
    use miette::IntoDiagnostic;
    use pretty_assertions::assert_eq;
    use std::fs;

    use crate::commands::archive::pack::PackArgs;
    use crate::commands::archive::test::write_sample_dat;

    #[test]
    fn interrupted_pack_fails() -> miette::Result<()> {
        let dir = tempfile::tempdir().into_diagnostic()?;
        let archive = dir.path().join("r006.dat");
        write_sample_dat(&archive)?;
        let manifest = unpack_archive(&archive, ArchiveKind::Dat, (), &CancellationToken::new())?;

        let token = CancellationToken::new();
        token.cancel();

        let args = PackArgs {
            manifest,
            output: Some(dir.path().join("out.dat")),
            empty_as_null: false,
        };
        assert!(args.handle(ArchiveKind::Dat, &token).is_err());

        let args = PackArgs {
            output: Some(dir.path().join("again.dat")),
            ..args
        };
        args.handle(ArchiveKind::Dat, &CancellationToken::new())?;
        assert_eq!(
            fs::read(dir.path().join("again.dat")).into_diagnostic()?,
            fs::read(&archive).into_diagnostic()?
        );

        Ok(())
    }
}
