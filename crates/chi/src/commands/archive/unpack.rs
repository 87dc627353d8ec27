use chi_archive::unpack::unpack_archive;
use chi_archive::{ArchiveKind, CancellationToken};
use clap::Args;
use miette::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use super::{run_worker, LogProgress};

#[derive(Args)]
pub struct UnpackArgs {
    /// An input archive
    #[arg(short, long, value_name = "FILE")]
    archive: PathBuf,
}

impl UnpackArgs {
    pub fn handle(&self, kind: ArchiveKind, token: &CancellationToken) -> Result<()> {
        let archive = self.archive.clone();
        let manifest = run_worker(token, move |token| {
            unpack_archive(&archive, kind, LogProgress, token)
        })
            .context(format!("unpacking {}", self.archive.display()))?;

        info!("wrote {}", manifest.display());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use chi_archive::{ArchiveKind, CancellationToken};
    use miette::IntoDiagnostic;

    use crate::commands::archive::test::write_sample_dat;
    use crate::commands::archive::unpack::UnpackArgs;

    #[test]
    fn interrupted_unpack_keeps_first_entry() -> miette::Result<()> {
        let dir = tempfile::tempdir().into_diagnostic()?;
        let archive = dir.path().join("ema0.dat");
        write_sample_dat(&archive)?;

        let token = CancellationToken::new();
        token.cancel();

        let args = UnpackArgs { archive };
        assert!(args.handle(ArchiveKind::Dat, &token).is_err());

        let unpacked = dir.path().join("UNPACK_ema0.dat");
        assert!(unpacked.join("FILES/TIM3/TIM3_000.tim3").exists());
        assert!(!unpacked.join("FILES/TIM3/TIM3_001.tim3").exists());
        assert!(!unpacked.join("METADATA.json").exists());

        Ok(())
    }

    #[test]
    fn unpack_writes_manifest() -> miette::Result<()> {
        let dir = tempfile::tempdir().into_diagnostic()?;
        let archive = dir.path().join("ema1.dat");
        write_sample_dat(&archive)?;

        let args = UnpackArgs { archive };
        args.handle(ArchiveKind::Dat, &CancellationToken::new())?;

        assert!(dir.path().join("UNPACK_ema1.dat/METADATA.json").exists());

        Ok(())
    }
}
