use std::io::IsTerminal;

use chi_archive::CancellationToken;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: chi::commands::Commands,
}

fn main() -> Result<()> {
    better_panic::install();

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(std::io::stdout().is_terminal())
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .without_time()
                .compact(),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init()
        .into_diagnostic()?;

    let token = CancellationToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        warn!("interrupted, stopping after the current entry");
        handler_token.cancel();
    })
    .into_diagnostic()?;

    cli.command.handle(&token)
}
