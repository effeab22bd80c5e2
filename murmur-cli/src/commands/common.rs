//! Flags shared across subcommands.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use murmur_core::{apply_branch_overrides, load_targets, Target};
use murmur_locator::{LocateError, Locator, Scope, ANY, TARGETS_SUFFIX};
use murmur_sync::SyncConfig;

/// Which files a command works on.
#[derive(Args, Debug, Clone)]
pub struct ScopeArgs {
    /// Root of the team/app/env data tree.
    #[arg(long, env = "DATADIR", default_value = ".")]
    pub datadir: PathBuf,

    #[arg(long, default_value = ANY)]
    pub team: String,

    #[arg(long, default_value = ANY)]
    pub app: String,

    #[arg(long, default_value = ANY)]
    pub env: String,

    /// Path filter under the data dir; overrides --team/--app/--env.
    #[arg(long)]
    pub filter: Option<String>,

    /// Stop at the first error instead of logging and moving on.
    #[arg(long)]
    pub errexit: bool,
}

impl ScopeArgs {
    pub fn scope(&self) -> Scope {
        Scope {
            team: self.team.clone(),
            app: self.app.clone(),
            env: self.env.clone(),
            filter: self.filter.clone(),
        }
    }

    pub fn locator(&self, suffix: &str) -> Result<Locator> {
        Ok(Locator::new(Some(absolute(&self.datadir)?), suffix, self.scope()))
    }

    /// Resolve `files` (or stdin, or a data dir scan). Nothing found is an
    /// empty list unless `--errexit` is set.
    pub fn locate(&self, suffix: &str, files: &[String]) -> Result<Vec<PathBuf>> {
        match self.locator(suffix)?.locate(files, io::stdin().lock()) {
            Ok(found) => Ok(found),
            Err(LocateError::NoMatches { .. }) if !self.errexit => Ok(Vec::new()),
            Err(e) => Err(e).context("unable to locate input files"),
        }
    }
}

/// Where destination repositories live and which branches to use.
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// Directory holding one working copy per name:branch.
    #[arg(long, env = "REPODIR", default_value = ".")]
    pub repodir: PathBuf,

    /// Override a target's branch (repeatable).
    #[arg(long = "branch", value_name = "NAME:BRANCH")]
    pub branches: Vec<String>,
}

impl RepoArgs {
    pub fn config(&self, strict: bool) -> Result<SyncConfig> {
        let work_dir = std::env::current_dir().context("could not determine working directory")?;
        let mut config = SyncConfig::new(absolute(&self.repodir)?, work_dir);
        config.strict = strict;
        config.token = SyncConfig::token_from_env();
        Ok(config)
    }

    /// Load descriptors and apply `--branch` overrides.
    pub fn targets(&self, scope: &ScopeArgs, files: &[String]) -> Result<Vec<Target>> {
        let descriptors = scope.locate(TARGETS_SUFFIX, files)?;
        let targets = apply_branch_overrides(&load_targets(&descriptors), &self.branches);
        tracing::debug!("{} target(s) from {} descriptor(s)", targets.len(), descriptors.len());
        Ok(targets)
    }
}

/// `path` resolved against the current directory.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("could not determine working directory")?;
    Ok(cwd.join(path))
}
