pub mod pack;
pub mod unpack;

use chi_archive::progress::run_job;
use chi_archive::{ArchiveKind, CancellationToken, JobState, Progress};
use miette::{miette, IntoDiagnostic, Result};
use tracing::{debug, info};

#[derive(clap::Subcommand)]
pub enum ArchiveCommands {
    /// Extract every entry next to the archive and write a manifest
    Unpack(unpack::UnpackArgs),
    /// Rebuild an archive from a manifest
    Pack(pack::PackArgs),
}

impl ArchiveCommands {
    pub fn handle(&self, kind: ArchiveKind, token: &CancellationToken) -> Result<()> {
        match self {
            ArchiveCommands::Unpack(unpack) => unpack.handle(kind, token),
            ArchiveCommands::Pack(pack) => pack.handle(kind, token),
        }
    }
}

/// Logs a line before and after every entry
pub struct LogProgress;

impl Progress for LogProgress {
    fn on_start(&mut self, total: u32, current: u32, name: &str) {
        info!("{current:>8}/{total}({name}): start");
    }

    fn on_done(&mut self, total: u32, current: u32, name: &str) {
        info!("{current:>8}/{total}({name}): done");
    }
}

/// Runs `job` on a worker thread and waits for it to finish.
///
/// The worker gets a clone of `token`, cancelling it makes the job return
/// [`chi_archive::error::Error::OperationCancelled`] at the next entry boundary.
pub fn run_worker<T, F>(token: &CancellationToken, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&CancellationToken) -> chi_archive::error::Result<T> + Send + 'static,
{
    let worker_token = token.clone();

    let handle = std::thread::Builder::new()
        .name("chi-worker".into())
        .spawn(move || {
            let mut state = JobState::Idle;
            let result = run_job(&mut state, || job(&worker_token));
            debug!(?state, "job finished");
            result
        })
        .into_diagnostic()?;

    let result = handle
        .join()
        .map_err(|_| miette!("worker thread panicked"))?;
    Ok(result?)
}
