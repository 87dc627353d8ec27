pub mod archive;
pub mod tim;

use archive::ArchiveCommands;
use chi_archive::{ArchiveKind, CancellationToken};

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle DAT archives
    Dat {
        #[command(subcommand)]
        command: ArchiveCommands,
    },
    /// Handle TM3 texture archives
    Tm3 {
        #[command(subcommand)]
        command: ArchiveCommands,
    },
    /// Handle TIM2, TIM3 and T32 textures
    Tim {
        #[command(subcommand)]
        command: tim::TimCommands,
    },
}

impl Commands {
    /// Runs the command; archive jobs stop at the next entry once `token` is cancelled
    pub fn handle(&self, token: &CancellationToken) -> miette::Result<()> {
        match self {
            Commands::Dat { command } => command.handle(ArchiveKind::Dat, token),
            Commands::Tm3 { command } => command.handle(ArchiveKind::Tm3, token),
            Commands::Tim { command } => command.handle(),
        }
    }
}
