//! `murmur generate`: render, clone, write and optionally commit in one run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use murmur_core::SystemRunner;
use murmur_locator::{JSONNET_SUFFIX, TARGETS_SUFFIX};
use murmur_render::JsonnetOptions;
use murmur_sync::{generate, GenerateOptions, Synchronizer, DEFAULT_COMMIT_MSG};

use super::common::{RepoArgs, ScopeArgs};
use super::jsonnet::print_outcomes;
use super::repos::print_reports;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Remove and re-clone working copies that already exist.
    #[arg(long)]
    pub overwrite: bool,

    /// Commit and push after writing.
    #[arg(long)]
    pub commit: bool,

    /// Script run in each changed working copy instead of commit + push.
    #[arg(long)]
    pub commit_script: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_COMMIT_MSG)]
    pub commit_msg: String,

    /// Replace the default `-m .` engine arguments.
    #[arg(long, allow_hyphen_values = true)]
    pub jsonnet_args: Option<String>,
}

impl GenerateArgs {
    pub fn run(self) -> Result<()> {
        let strict = self.scope.errexit;
        let mut config = self.repo.config(strict)?;
        config.overwrite = self.overwrite;
        config.commit_script = self.commit_script;
        config.commit_msg = self.commit_msg;

        let opts = GenerateOptions {
            jsonnet: JsonnetOptions::new(self.jsonnet_args.as_deref(), Path::new("."), strict),
            overrides: self.repo.branches.clone(),
            commit: self.commit,
        };
        let sources = self.scope.locator(JSONNET_SUFFIX)?;
        let descriptors = self.scope.locator(TARGETS_SUFFIX)?;

        let sync = Synchronizer::new(SystemRunner, config);
        let result = generate(&sync, &sources, &descriptors, &opts).context("generate failed")?;

        print_outcomes(&result.rendered);
        print_reports(&result.cloned);
        let written: usize = result.written.iter().map(|r| r.writes.len()).sum();
        println!("{written} artifact(s) across {} target(s)", result.written.len());
        print_reports(&result.committed);
        result.ensure_complete().context("generate failed")?;
        Ok(())
    }
}
