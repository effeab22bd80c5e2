//! Clone and commit against destination repositories.
//!
//! Both operations walk the unique `name:branch` destinations in load order,
//! skip local (`repo: "."`) targets entirely, and drive `git` through the
//! [`CommandRunner`] held by the [`Synchronizer`].

use std::path::Path;

use murmur_core::{unique_destinations, CommandOutput, CommandRunner, CommandSpec, Target};

use crate::config::{SyncConfig, TOKEN_ENV};
use crate::error::{io_err, SyncError};
use crate::git;
use crate::report::{Outcome, RepoSummary, SkipReason, TargetReport};
use crate::writer::{self, WriteReport};

/// Applies clone / write / commit to a set of targets.
#[derive(Debug)]
pub struct Synchronizer<R> {
    runner: R,
    config: SyncConfig,
}

impl<R: CommandRunner> Synchronizer<R> {
    pub fn new(runner: R, config: SyncConfig) -> Self {
        Self { runner, config }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // list
    // -----------------------------------------------------------------------

    /// Unique destinations in load order.
    pub fn list_repos(&self, targets: &[Target]) -> Vec<RepoSummary> {
        unique_destinations(targets)
            .into_iter()
            .map(RepoSummary::from)
            .collect()
    }

    // -----------------------------------------------------------------------
    // clone
    // -----------------------------------------------------------------------

    /// Shallow-clone every remote destination into `<repo_dir>/<name>:<branch>`.
    ///
    /// An existing working copy is skipped unless `overwrite` is set, in which
    /// case it is removed first. In strict mode the first failure is returned;
    /// otherwise it is recorded as [`Outcome::Failed`] and the run continues.
    pub fn clone_repos(&self, targets: &[Target]) -> Result<Vec<TargetReport>, SyncError> {
        let remote: Vec<&Target> = unique_destinations(targets)
            .into_iter()
            .filter(|t| !t.is_local())
            .collect();
        if remote.is_empty() {
            tracing::debug!("no remote repositories to clone");
            return Ok(Vec::new());
        }

        let root = &self.config.repo_dir;
        std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;

        if self.config.token.is_none() {
            tracing::warn!(
                "{TOKEN_ENV} is not set: pushes will fail unless a commit script handles authentication"
            );
        }

        let mut reports = Vec::with_capacity(remote.len());
        for target in remote {
            let dir = root.join(target.clone_dir());
            let outcome = match self.clone_one(target, &dir) {
                Ok(outcome) => outcome,
                Err(e) if self.config.strict => return Err(e),
                Err(e) => {
                    tracing::error!(
                        "unable to clone repository {} ({}): {e}",
                        target.repo,
                        target.branch
                    );
                    Outcome::Failed(e.to_string())
                }
            };
            reports.push(report(target, &dir, outcome));
        }
        Ok(reports)
    }

    fn clone_one(&self, target: &Target, dir: &Path) -> Result<Outcome, SyncError> {
        let key = target.key().to_string();

        if dir.exists() {
            if !self.config.overwrite {
                if self.config.strict {
                    return Err(SyncError::CloneDirExists {
                        target: key,
                        path: dir.to_path_buf(),
                    });
                }
                tracing::warn!(
                    "repository {} ({}) will not be re-cloned: {} exists (specify --overwrite to overwrite existing repos)",
                    target.repo,
                    target.branch,
                    dir.display()
                );
                return Ok(Outcome::Skipped(SkipReason::AlreadyCloned));
            }
            tracing::info!("removing existing clone {}", dir.display());
            std::fs::remove_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }

        tracing::info!(
            "cloning {} ({}) into {}",
            target.repo,
            target.branch,
            dir.display()
        );
        let cmd = git::clone_cmd(
            &self.config.repo_dir,
            target,
            &self.config.remote_host,
            self.config.token.as_deref(),
        );
        self.run_checked("clone", &key, &cmd)?;
        Ok(Outcome::Cloned)
    }

    // -----------------------------------------------------------------------
    // write
    // -----------------------------------------------------------------------

    /// Copy each target's artifacts into its destination; see [`writer`].
    pub fn write_repos(&self, targets: &[Target]) -> Result<Vec<WriteReport>, SyncError> {
        writer::write_targets(&self.config, targets)
    }

    // -----------------------------------------------------------------------
    // commit
    // -----------------------------------------------------------------------

    /// Stage, and when something changed, commit and push (or run the commit
    /// script) in every remote working copy.
    ///
    /// Temporary files left by an interrupted write are deleted before
    /// staging so they never reach a commit.
    pub fn commit_repos(&self, targets: &[Target]) -> Result<Vec<TargetReport>, SyncError> {
        let mut reports = Vec::new();
        for target in unique_destinations(targets).into_iter().filter(|t| !t.is_local()) {
            let dir = self.config.repo_dir.join(target.clone_dir());
            let outcome = match self.commit_one(target, &dir) {
                Ok(outcome) => outcome,
                Err(e) if self.config.strict => return Err(e),
                Err(e) => {
                    tracing::error!(
                        "unable to commit repository {} ({}) in {}: {e}",
                        target.repo,
                        target.branch,
                        dir.display()
                    );
                    Outcome::Failed(e.to_string())
                }
            };
            reports.push(report(target, &dir, outcome));
        }
        Ok(reports)
    }

    fn commit_one(&self, target: &Target, dir: &Path) -> Result<Outcome, SyncError> {
        let key = target.key().to_string();
        if !dir.is_dir() {
            return Err(SyncError::NotCloned {
                target: key,
                path: dir.to_path_buf(),
            });
        }

        writer::remove_stale_temp_files(dir)?;
        self.run_checked("stage", &key, &git::add_all_cmd(dir))?;

        let diff = git::staged_diff_cmd(dir);
        let out = self.run(&key, &diff)?;
        match out.status {
            Some(0) => {
                tracing::info!("no changes to commit in {}", dir.display());
                return Ok(Outcome::NoChanges);
            }
            Some(1) => {}
            _ => return Err(git_failure("diff", &key, &diff, &out)),
        }

        if let Some(script) = self.config.resolved_commit_script() {
            tracing::info!("running commit script {} in {}", script.display(), dir.display());
            let cmd = git::script_cmd(&script, dir);
            let out = self.run(&key, &cmd)?;
            if !out.success() {
                return Err(SyncError::Script {
                    target: key,
                    script,
                    stderr: cmd.redacted(out.stderr.trim()),
                });
            }
            return Ok(Outcome::ScriptRan);
        }

        let token = self.config.token.as_deref();
        self.run_checked("commit", &key, &git::commit_cmd(dir, &self.config.commit_msg))?;
        self.run_checked("push", &key, &git::push_cmd(dir, token))?;
        tracing::info!("pushed {} ({})", target.repo, target.branch);
        Ok(Outcome::Pushed)
    }

    // -----------------------------------------------------------------------
    // process helpers
    // -----------------------------------------------------------------------

    fn run(&self, key: &str, cmd: &CommandSpec) -> Result<CommandOutput, SyncError> {
        tracing::debug!("running `{cmd}`");
        self.runner.run(cmd).map_err(|source| SyncError::Spawn {
            target: key.to_string(),
            command: cmd.to_string(),
            source,
        })
    }

    fn run_checked(
        &self,
        op: &'static str,
        key: &str,
        cmd: &CommandSpec,
    ) -> Result<CommandOutput, SyncError> {
        let out = self.run(key, cmd)?;
        if out.success() {
            Ok(out)
        } else {
            Err(git_failure(op, key, cmd, &out))
        }
    }
}

fn git_failure(op: &'static str, key: &str, cmd: &CommandSpec, out: &CommandOutput) -> SyncError {
    SyncError::Git {
        op,
        target: key.to_string(),
        command: cmd.to_string(),
        dir: cmd.dir().map(Path::to_path_buf).unwrap_or_default(),
        stderr: cmd.redacted(out.stderr.trim()),
    }
}

fn report(target: &Target, dir: &Path, outcome: Outcome) -> TargetReport {
    TargetReport {
        key: target.key(),
        repo: target.repo.clone(),
        dir: dir.to_path_buf(),
        outcome,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
