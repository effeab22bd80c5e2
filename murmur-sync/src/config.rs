//! Run configuration for the synchronizer.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Commit message used when none is given.
pub const DEFAULT_COMMIT_MSG: &str = "murmur commit";

/// Remote host repositories are cloned from.
pub const DEFAULT_REMOTE_HOST: &str = "https://github.com";

/// Environment variable holding the auth token embedded in remote URLs.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Which artifact naming convention `write` and `diff` match.
///
/// Two conventions are in use and neither is authoritative:
///
/// | mode     | glob (in the descriptor's dir) |
/// |----------|--------------------------------|
/// | `prefix` | `<prefix>-<type>.json`         |
/// | `app`    | `*-<app>-<type>.json`          |
///
/// `prefix` only picks up artifacts rendered alongside the descriptor's own
/// prefix. `app` is broader: two descriptors in one directory that share an
/// app will each copy the other's artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Prefix,
    App,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prefix" => Ok(Self::Prefix),
            "app" => Ok(Self::App),
            other => Err(format!("unknown match mode '{other}'; expected: prefix, app")),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Prefix => write!(f, "prefix"),
            MatchMode::App => write!(f, "app"),
        }
    }
}

/// Everything clone / write / commit need besides the targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Root holding one working copy per `name:branch`.
    pub repo_dir: PathBuf,
    /// Invocation directory; local (`repo: "."`) targets write here.
    pub work_dir: PathBuf,
    /// Replace existing working copies instead of skipping them.
    pub overwrite: bool,
    /// Abort at the first per-target failure.
    pub strict: bool,
    /// Report what `write` would copy without touching disk.
    pub dry_run: bool,
    pub commit_msg: String,
    /// Replaces the default commit + push when set.
    pub commit_script: Option<PathBuf>,
    pub token: Option<String>,
    pub remote_host: String,
    pub match_mode: MatchMode,
}

impl SyncConfig {
    pub fn new(repo_dir: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            work_dir: work_dir.into(),
            overwrite: false,
            strict: false,
            dry_run: false,
            commit_msg: DEFAULT_COMMIT_MSG.to_string(),
            commit_script: None,
            token: None,
            remote_host: DEFAULT_REMOTE_HOST.to_string(),
            match_mode: MatchMode::default(),
        }
    }

    /// Token from [`TOKEN_ENV`]; empty values count as unset.
    pub fn token_from_env() -> Option<String> {
        std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty())
    }

    /// Base a target's paths hang off: the work dir for local targets,
    /// the repo dir otherwise.
    pub fn base_for(&self, local: bool) -> &Path {
        if local {
            &self.work_dir
        } else {
            &self.repo_dir
        }
    }

    /// Commit script as an absolute path, resolved against the work dir.
    pub fn resolved_commit_script(&self) -> Option<PathBuf> {
        self.commit_script.as_ref().map(|script| {
            if script.is_absolute() {
                script.clone()
            } else {
                self.work_dir.join(script)
            }
        })
    }
}
