use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::args::{Cli, Commands};
use transfer_tray::config::{TrayConfig, Verbosity};
use transfer_tray::error::TrayError;

fn main() {
    let cli = Cli::parse();

    // Convert CLI flags to verbosity level
    let verbosity = Verbosity::from((cli.quiet, cli.verbose));

    // RUST_LOG env var overrides CLI flags
    let filter = verbosity.as_tracing_filter();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr) // Keep stdout clean for output
        .init();

    tracing::debug!("Verbosity level: {:?}", verbosity);

    if let Err(err) = run(cli) {
        display_error(&err);
        std::process::exit(1);
    }
}

/// Execute the dispatched command.
fn run(cli: Cli) -> Result<(), TrayError> {
    let config = TrayConfig::load_or_default(cli.config.as_deref())?;
    match cli.command {
        Commands::Replay(args) => cli::execute_replay(args, config, cli.quiet),
        Commands::Show(args) => cli::execute_show(args, config, cli.quiet),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Display a TrayError with optional suggestion hint to stderr.
fn display_error(err: &TrayError) {
    eprintln!("error: {}", err);
    if let Some(suggestion) = err.suggestion() {
        eprintln!("  hint: {}", suggestion);
    }
}
