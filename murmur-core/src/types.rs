//! Domain types for murmur routing rules.
//!
//! All path fields use `PathBuf`; descriptor fields that are plain identifiers
//! stay `String` because they round-trip through JSON unchanged.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Sentinel `repo` value: write into the invocation directory, never touch git.
pub const LOCAL_REPO: &str = ".";

/// Literal suffix every descriptor filename carries.
pub const DESCRIPTOR_SUFFIX: &str = "-targets.json";

// ---------------------------------------------------------------------------
// TargetKey
// ---------------------------------------------------------------------------

/// The `(name, branch)` identity of a destination.
///
/// Two targets with equal keys are the same destination and are cloned and
/// committed at most once per run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TargetKey {
    pub name: String,
    pub branch: String,
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.branch)
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// One routing rule decoded from a `<prefix>-targets.json` descriptor.
///
/// `name` never contains `:` (the loader rejects it), so `name:branch` is
/// unambiguous.
///
/// ```json
/// {
///   "name": "ets-cloudops-infrastructure",
///   "repo": "cfacorp/ets-cloudops-infrastructure",
///   "path": "data",
///   "branch": "master",
///   "app": "pyrenees",
///   "types": ["datasources", "connections"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Target {
    pub app: String,
    pub branch: String,
    pub name: String,
    pub path: String,
    pub repo: String,
    pub types: Vec<String>,

    /// Directory holding the descriptor file.
    #[serde(skip)]
    pub dir: PathBuf,
    /// Base name of the descriptor file.
    #[serde(skip)]
    pub filename: String,
    /// Descriptor filename minus [`DESCRIPTOR_SUFFIX`]; shared by its artifacts.
    #[serde(skip)]
    pub prefix: String,
}

impl Target {
    pub fn key(&self) -> TargetKey {
        TargetKey {
            name: self.name.clone(),
            branch: self.branch.clone(),
        }
    }

    /// `true` for the `repo: "."` sentinel.
    pub fn is_local(&self) -> bool {
        self.repo == LOCAL_REPO
    }

    /// On-disk directory name of the working copy, relative to the repo root.
    ///
    /// `"."` for local targets, `"<name>:<branch>"` otherwise.
    pub fn clone_dir(&self) -> String {
        if self.is_local() {
            LOCAL_REPO.to_string()
        } else {
            self.key().to_string()
        }
    }

    /// `<base>/<clone_dir>/<path>`, where this target's types are written.
    ///
    /// `base` is the repo root for remote targets and the invocation
    /// directory for local ones; the caller picks.
    pub fn destination_root(&self, base: &Path) -> PathBuf {
        base.join(self.clone_dir()).join(&self.path)
    }
}

/// Targets with a distinct [`TargetKey`], first occurrence wins, load order kept.
pub fn unique_destinations(targets: &[Target]) -> Vec<&Target> {
    let mut seen = HashSet::new();
    targets
        .iter()
        .filter(|t| seen.insert(t.key()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
