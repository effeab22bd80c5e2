//! Per-target outcomes of clone and commit runs.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use murmur_core::{Target, TargetKey};

use crate::error::SyncError;

/// Why a target was not acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Working copy present and overwrite not requested.
    AlreadyCloned,
}

/// Terminal state of one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Cloned,
    Skipped(SkipReason),
    /// Nothing staged after `git add`; no commit, no push.
    NoChanges,
    Pushed,
    ScriptRan,
    Failed(String),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Cloned => write!(f, "cloned"),
            Outcome::Skipped(SkipReason::AlreadyCloned) => write!(f, "skipped (already cloned)"),
            Outcome::NoChanges => write!(f, "no changes"),
            Outcome::Pushed => write!(f, "pushed"),
            Outcome::ScriptRan => write!(f, "commit script ran"),
            Outcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// What happened to one `name:branch` destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub key: TargetKey,
    pub repo: String,
    /// Working copy directory.
    pub dir: PathBuf,
    pub outcome: Outcome,
}

/// `Ok` unless some report is [`Outcome::Failed`], in which case the failed
/// targets are listed in an [`SyncError::Incomplete`].
pub fn ensure_complete(reports: &[TargetReport]) -> Result<(), SyncError> {
    let failed: Vec<String> = reports
        .iter()
        .filter(|r| r.outcome.is_failed())
        .map(|r| r.key.to_string())
        .collect();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(SyncError::Incomplete { failed })
    }
}

/// One row of `repos list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoSummary {
    pub name: String,
    pub repo: String,
    pub branch: String,
    pub clone_dir: String,
}

impl From<&Target> for RepoSummary {
    fn from(t: &Target) -> Self {
        Self {
            name: t.name.clone(),
            repo: t.repo.clone(),
            branch: t.branch.clone(),
            clone_dir: t.clone_dir(),
        }
    }
}

impl fmt::Display for RepoSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repo, self.branch)
    }
}
