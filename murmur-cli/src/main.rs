//! murmur: render configuration and distribute it to destination repos.
//!
//! # Usage
//!
//! ```text
//! murmur generate [scope] [--repodir DIR] [--overwrite] [--commit] [--branch name:branch]...
//! murmur repos list|clone|write|diff|commit [scope] [files...]
//! murmur jsonnet list|render [scope] [files...]
//! murmur jsonnet create team/app/env
//! ```
//!
//! `scope` is `--datadir`, `--team`, `--app`, `--env`, `--filter` and
//! `--errexit`. A single `-` in place of files reads the list from stdin.

mod commands;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{generate::GenerateArgs, jsonnet::JsonnetCommand, repos::ReposCommand};
use logging::LogFormat;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "murmur",
    version,
    about = "Render configuration and sync it into destination repositories",
    long_about = None,
)]
struct Cli {
    /// Log level; RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "error", value_parser = logging::LEVELS)]
    loglevel: String,

    /// Log line format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render sources, then clone, write and optionally commit every target.
    Generate(GenerateArgs),

    /// Work with destination repositories.
    Repos {
        #[command(subcommand)]
        command: ReposCommand,
    },

    /// Work with jsonnet sources.
    Jsonnet {
        #[command(subcommand)]
        command: JsonnetCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(e) = logging::init(&cli.loglevel, cli.log_format) {
        eprintln!("murmur: unable to initialise logging: {e}");
    }

    match cli.command {
        Commands::Generate(args) => args.run(),
        Commands::Repos { command } => commands::repos::run(command),
        Commands::Jsonnet { command } => commands::jsonnet::run(command),
    }
}
