//! Config editor CLI
//!
//! Offline access to the document pipeline: clean a document with an
//! editor configuration, diff two documents, or check an entry of a
//! collection the way a submission would.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use commands::CheckArgs;
use error::Result;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to initialise logging: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");

    if let Err(e) = execute_command(cli.command) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Clean {
            config,
            document,
            output,
        } => commands::run_clean(&config, &document, output.as_deref()),
        Commands::Diff {
            old,
            new,
            json,
            text,
        } => commands::run_diff(&old, &new, json, text),
        Commands::Check {
            config,
            collection,
            index,
            user,
            name,
            document,
            json,
        } => commands::run_check(&CheckArgs {
            config,
            collection,
            index,
            user,
            name,
            document,
            json,
        }),
    }
}
