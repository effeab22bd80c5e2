//! `murmur jsonnet`: list, render and scaffold sources.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use murmur_core::SystemRunner;
use murmur_locator::JSONNET_SUFFIX;
use murmur_render::{create_at, render_files, JsonnetOptions, RenderOutcome, ScaffoldScope};

use super::common::{absolute, ScopeArgs};

#[derive(Subcommand, Debug)]
pub enum JsonnetCommand {
    /// Print located sources.
    List(ListArgs),
    /// Run jsonnet over located sources.
    Render(RenderArgs),
    /// Scaffold <datadir>/<team>/<app>/<env>/<app>.jsonnet from tmpl/<app>.jsonnet.tmpl.
    Create(CreateArgs),
}

pub fn run(command: JsonnetCommand) -> Result<()> {
    match command {
        JsonnetCommand::List(args) => args.run(),
        JsonnetCommand::Render(args) => args.run(),
        JsonnetCommand::Create(args) => args.run(),
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    pub files: Vec<String>,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        for file in self.scope.locate(JSONNET_SUFFIX, &self.files)? {
            println!("{}", file.display());
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Output directory for `-m`; defaults to each source's own directory.
    #[arg(long)]
    pub destdir: Option<PathBuf>,

    /// Replace the default `-m <destdir>` engine arguments.
    #[arg(long, allow_hyphen_values = true)]
    pub jsonnet_args: Option<String>,

    pub files: Vec<String>,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let files = self.scope.locate(JSONNET_SUFFIX, &self.files)?;
        let destdir = match &self.destdir {
            Some(dir) => absolute(dir)?,
            None => PathBuf::from("."),
        };
        let opts = JsonnetOptions::new(self.jsonnet_args.as_deref(), &destdir, self.scope.errexit);

        let outcomes = render_files(&SystemRunner, &opts, &files).context("render failed")?;
        print_outcomes(&outcomes);
        Ok(())
    }
}

pub(crate) fn print_outcomes(outcomes: &[RenderOutcome]) {
    for outcome in outcomes {
        match outcome {
            RenderOutcome::Rendered { file } => {
                println!("{} {}", "✓".green(), file.display())
            }
            RenderOutcome::Failed { file, .. } => {
                println!("{} {}", "✗".red(), file.display())
            }
        }
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// team/app/env
    pub scope: ScaffoldScope,

    #[arg(long, env = "DATADIR", default_value = ".")]
    pub datadir: PathBuf,
}

impl CreateArgs {
    pub fn run(self) -> Result<()> {
        let created = create_at(&self.datadir, &self.scope)
            .with_context(|| {
                format!(
                    "unable to create source for {}/{}/{}",
                    self.scope.team, self.scope.app, self.scope.env
                )
            })?;
        println!("{} {}", "✓".green(), created.display());
        Ok(())
    }
}
